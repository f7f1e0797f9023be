use std::sync::LazyLock;

use regex::Regex;

use crate::block::{Block, List, ListItem, ListKind};
use crate::inline;

const FENCE: &str = "```";
const QUOTE: &str = "> ";

/// Heading markers, longest first so `### ` is never read as `# `.
const HEADINGS: [(&str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];

static UNORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s").expect("valid unordered item pattern"));
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s").expect("valid ordered item pattern"));
static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*_]{3,}$").expect("valid rule pattern"));

/// Parse reply text into a list of blocks
pub fn parse(text: &str) -> Vec<Block> {
    let mut state = ParseState::default();

    for line in text.lines() {
        process_line(line, &mut state);
    }

    state.finish()
}

/// Carry-over state for the line loop: at most one open list and one open
/// code fence.
#[derive(Default)]
struct ParseState {
    blocks: Vec<Block>,
    list: Option<List>,
    fence: Option<FenceBuilder>,
}

struct FenceBuilder {
    language: Option<String>,
    lines: Vec<String>,
}

impl FenceBuilder {
    fn open(info: &str) -> Self {
        let info = info.trim();
        Self {
            language: (!info.is_empty()).then(|| info.to_string()),
            lines: Vec::new(),
        }
    }

    fn into_block(self) -> Block {
        Block::CodeBlock {
            language: self.language,
            lines: self.lines,
        }
    }
}

impl ParseState {
    fn flush_list(&mut self) {
        if let Some(list) = self.list.take() {
            self.blocks.push(Block::List(list));
        }
    }

    fn push_item(&mut self, kind: ListKind, content: &str) {
        if self.list.as_ref().is_some_and(|list| list.kind != kind) {
            self.flush_list();
        }
        let list = self.list.get_or_insert_with(|| List::new(kind));
        list.items.push(ListItem {
            content: inline::format(content),
        });
    }

    fn push(&mut self, block: Block) {
        self.flush_list();
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_list();
        if let Some(fence) = self.fence.take() {
            log::debug!(
                "Unterminated code fence, flushing {} buffered lines",
                fence.lines.len()
            );
            self.blocks.push(fence.into_block());
        }
        log::debug!("Parsed {} blocks", self.blocks.len());
        self.blocks
    }
}

fn process_line(line: &str, state: &mut ParseState) {
    // Code fences toggle; everything inside is taken verbatim
    if let Some(info) = line.strip_prefix(FENCE) {
        match state.fence.take() {
            Some(fence) => state.blocks.push(fence.into_block()),
            None => {
                state.flush_list();
                state.fence = Some(FenceBuilder::open(info));
            }
        }
        return;
    }
    if let Some(fence) = state.fence.as_mut() {
        fence.lines.push(line.to_string());
        return;
    }

    // Blank lines close lists and become spacing, never leading
    if line.trim().is_empty() {
        state.flush_list();
        if !state.blocks.is_empty() {
            state.blocks.push(Block::LineBreak);
        }
        return;
    }

    for (marker, level) in HEADINGS {
        if let Some(text) = line.strip_prefix(marker) {
            state.push(Block::Heading {
                level,
                text: text.to_string(),
            });
            return;
        }
    }

    if let Some(quoted) = line.strip_prefix(QUOTE) {
        state.push(Block::Blockquote {
            content: inline::format(quoted),
        });
        return;
    }

    if let Some(marker) = UNORDERED_ITEM.find(line) {
        state.push_item(ListKind::Unordered, &line[marker.end()..]);
        return;
    }
    if let Some(marker) = ORDERED_ITEM.find(line) {
        state.push_item(ListKind::Ordered, &line[marker.end()..]);
        return;
    }

    if RULE.is_match(line) {
        state.push(Block::Rule);
        return;
    }

    state.flush_list();
    if !line.trim().is_empty() {
        state.blocks.push(Block::Paragraph {
            content: inline::format(line),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Span;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn text(s: &str) -> Vec<Span> {
        vec![Span::Text(s.to_string())]
    }

    fn list(kind: ListKind, items: &[&str]) -> Block {
        Block::List(List {
            kind,
            items: items
                .iter()
                .map(|item| ListItem { content: text(item) })
                .collect(),
        })
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(""), vec![]);
    }

    #[test]
    fn whitespace_only_input() {
        assert_eq!(parse("   \n\t\n"), vec![]);
    }

    #[rstest]
    #[case("# Title", 1, "Title")]
    #[case("## Section", 2, "Section")]
    #[case("### Sub", 3, "Sub")]
    #[case("#  spaced ", 1, " spaced ")]
    fn headings(#[case] input: &str, #[case] level: u8, #[case] expected: &str) {
        assert_eq!(
            parse(input),
            vec![Block::Heading {
                level,
                text: expected.to_string(),
            }]
        );
    }

    #[test]
    fn heading_text_is_not_formatted() {
        assert_eq!(
            parse("# **Plan**"),
            vec![Block::Heading {
                level: 1,
                text: "**Plan**".to_string(),
            }]
        );
    }

    #[rstest]
    #[case("#Title")]
    #[case("#### Deep")]
    fn non_headings_are_paragraphs(#[case] input: &str) {
        assert_eq!(parse(input), vec![Block::Paragraph { content: text(input) }]);
    }

    #[test]
    fn unordered_list() {
        assert_eq!(
            parse("- a\n- b\n- c"),
            vec![list(ListKind::Unordered, &["a", "b", "c"])]
        );
    }

    #[test]
    fn mixed_bullets_share_one_list() {
        assert_eq!(
            parse("- a\n* b\n  + c"),
            vec![list(ListKind::Unordered, &["a", "b", "c"])]
        );
    }

    #[test]
    fn ordered_list() {
        assert_eq!(
            parse("1. first\n2. second\n10. tenth"),
            vec![list(ListKind::Ordered, &["first", "second", "tenth"])]
        );
    }

    #[test]
    fn kind_switch_closes_list() {
        assert_eq!(
            parse("- a\n1. b"),
            vec![
                list(ListKind::Unordered, &["a"]),
                list(ListKind::Ordered, &["b"]),
            ]
        );
    }

    #[test]
    fn list_items_are_formatted() {
        assert_eq!(
            parse("- **key** point"),
            vec![Block::List(List {
                kind: ListKind::Unordered,
                items: vec![ListItem {
                    content: vec![
                        Span::Bold(vec![Span::Text("key".to_string())]),
                        Span::Text(" point".to_string()),
                    ],
                }],
            })]
        );
    }

    #[test]
    fn heading_interrupts_list() {
        assert_eq!(
            parse("- a\n## Next\n- b"),
            vec![
                list(ListKind::Unordered, &["a"]),
                Block::Heading {
                    level: 2,
                    text: "Next".to_string(),
                },
                list(ListKind::Unordered, &["b"]),
            ]
        );
    }

    #[test]
    fn rule_interrupts_list() {
        assert_eq!(
            parse("1. a\n***"),
            vec![list(ListKind::Ordered, &["a"]), Block::Rule]
        );
    }

    #[rstest]
    #[case("---")]
    #[case("*****")]
    #[case("___")]
    fn horizontal_rules(#[case] input: &str) {
        assert_eq!(parse(input), vec![Block::Rule]);
    }

    #[test]
    fn two_dashes_are_a_paragraph() {
        assert_eq!(parse("--"), vec![Block::Paragraph { content: text("--") }]);
    }

    #[test]
    fn blockquote() {
        assert_eq!(
            parse("> be *kind*"),
            vec![Block::Blockquote {
                content: vec![
                    Span::Text("be ".to_string()),
                    Span::Italic(vec![Span::Text("kind".to_string())]),
                ],
            }]
        );
    }

    #[test]
    fn blank_lines_become_breaks_after_first_block() {
        assert_eq!(
            parse("\n\nfirst\n\n\nsecond"),
            vec![
                Block::Paragraph { content: text("first") },
                Block::LineBreak,
                Block::LineBreak,
                Block::Paragraph { content: text("second") },
            ]
        );
    }

    #[test]
    fn blank_line_after_list_counts_the_list() {
        assert_eq!(
            parse("- a\n\ntext"),
            vec![
                list(ListKind::Unordered, &["a"]),
                Block::LineBreak,
                Block::Paragraph { content: text("text") },
            ]
        );
    }

    #[test]
    fn code_fence() {
        assert_eq!(
            parse("```rust\nlet x = 1;\n\n# not a heading\n```"),
            vec![Block::CodeBlock {
                language: Some("rust".to_string()),
                lines: vec![
                    "let x = 1;".to_string(),
                    String::new(),
                    "# not a heading".to_string(),
                ],
            }]
        );
    }

    #[test]
    fn code_fence_without_language() {
        assert_eq!(
            parse("```\n**raw**\n```\nafter"),
            vec![
                Block::CodeBlock {
                    language: None,
                    lines: vec!["**raw**".to_string()],
                },
                Block::Paragraph { content: text("after") },
            ]
        );
    }

    #[test]
    fn unclosed_fence_is_flushed() {
        assert_eq!(
            parse("```js\ncode here"),
            vec![Block::CodeBlock {
                language: Some("js".to_string()),
                lines: vec!["code here".to_string()],
            }]
        );
    }

    #[test]
    fn empty_fence_is_kept() {
        assert_eq!(
            parse("```\n```"),
            vec![Block::CodeBlock {
                language: None,
                lines: vec![],
            }]
        );
    }

    #[test]
    fn fence_closes_open_list() {
        assert_eq!(
            parse("- a\n```\nx\n```"),
            vec![
                list(ListKind::Unordered, &["a"]),
                Block::CodeBlock {
                    language: None,
                    lines: vec!["x".to_string()],
                },
            ]
        );
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(
            parse("# Title\r\n- a\r\n- b\r\n"),
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title".to_string(),
                },
                list(ListKind::Unordered, &["a", "b"]),
            ]
        );
    }

    #[test]
    fn trailing_newline_adds_no_break() {
        assert_eq!(parse("a\n"), vec![Block::Paragraph { content: text("a") }]);
        assert_eq!(
            parse("a\n\n"),
            vec![Block::Paragraph { content: text("a") }, Block::LineBreak]
        );
    }

    #[test]
    fn plain_text_is_one_paragraph() {
        assert_eq!(
            parse("Just a sentence."),
            vec![Block::Paragraph {
                content: text("Just a sentence."),
            }]
        );
    }
}
