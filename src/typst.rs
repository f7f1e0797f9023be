use crate::block::{Block, List, Span, spans_are_blank};
use crate::config::Config;

/// Lists up to this size are kept on one page.
const UNBREAKABLE_LIST_ITEMS: usize = 5;

/// Convert blocks to Typst markup
pub fn blocks_to_typst(blocks: &[Block], config: &Config) -> String {
    let mut out = preamble(config);
    let mut emitted = false;

    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];

        match block {
            Block::Heading { .. } => {
                // Keep heading with following content using a block that prevents breaks
                out.push_str("#block(breakable: false)[\n");
                emit_block(block, &mut out);

                if let Some(next) = blocks.get(i + 1) {
                    if keeps_with_heading(next) {
                        i += 1;
                        emit_block(next, &mut out);
                    }
                }
                out.push_str("]\n\n");
                emitted = true;
            }
            Block::LineBreak if !emitted => {}
            Block::Paragraph { content } if spans_are_blank(content) => {}
            _ => {
                emit_block(block, &mut out);
                emitted = true;
            }
        }

        i += 1;
    }

    out
}

fn preamble(config: &Config) -> String {
    let mut out = String::new();

    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    if config.page.numbers {
        out.push_str("#set page(numbering: \"1\")\n");
    }
    if config.font.sans {
        out.push_str("#set text(font: (\"Open Sans\", \"DejaVu Sans\", \"Libertinus Serif\"))\n");
    }
    out.push_str("#show link: set text(fill: rgb(\"");
    push_string_literal(&config.links.color, &mut out);
    out.push_str("\"))\n");
    if config.links.underline {
        out.push_str("#show link: underline\n");
    }
    out.push('\n');
    out
}

fn keeps_with_heading(next: &Block) -> bool {
    !matches!(next, Block::Heading { .. } | Block::LineBreak)
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, text } => {
            for _ in 0..*level {
                out.push('=');
            }
            out.push(' ');
            escape_text(text, out);
            out.push_str("\n\n");
        }
        Block::Paragraph { content } => {
            line_to_typst(content, out);
            out.push_str("\n\n");
        }
        Block::List(list) => {
            // Wrap list to keep together when small, allow breaks when large
            if list.items.len() <= UNBREAKABLE_LIST_ITEMS {
                out.push_str("#block(breakable: false)[\n");
                list_to_typst(list, out);
                out.push_str("]\n\n");
            } else {
                list_to_typst(list, out);
                out.push('\n');
            }
        }
        Block::Blockquote { content } => {
            out.push_str("#quote(block: true)[");
            line_to_typst(content, out);
            out.push_str("]\n\n");
        }
        Block::CodeBlock { language, lines } => {
            let fence = "`".repeat(fence_len(lines));
            out.push_str("#block(breakable: false)[\n");
            out.push_str(&fence);
            if let Some(lang) = language.as_deref().filter(|lang| is_raw_lang(lang)) {
                out.push_str(lang);
            }
            out.push('\n');
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(&fence);
            out.push_str("\n]\n\n");
        }
        Block::Rule => {
            out.push_str("#line(length: 100%)\n\n");
        }
        Block::LineBreak => {
            out.push_str("#v(0.5em)\n\n");
        }
    }
}

/// Raw fence long enough that no backtick run in the content closes it.
fn fence_len(lines: &[String]) -> usize {
    let longest_run = lines
        .iter()
        .flat_map(|line| line.split(|c: char| c != '`'))
        .map(str::len)
        .max()
        .unwrap_or(0);
    (longest_run + 1).max(3)
}

fn list_to_typst(list: &List, out: &mut String) {
    let prefix = if list.is_ordered() { "+" } else { "-" };

    for item in &list.items {
        out.push_str(prefix);
        out.push(' ');
        line_to_typst(&item.content, out);
        out.push('\n');
    }
}

/// Raw block language tags Typst reads whole. Others are dropped so they
/// don't leak into the code.
fn is_raw_lang(lang: &str) -> bool {
    lang.starts_with(|c: char| c.is_ascii_alphabetic())
        && lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Spans that start a markup line. A leading `-`, `+` or `1.` is escaped so
/// Typst does not read it as a list marker.
fn line_to_typst(spans: &[Span], out: &mut String) {
    let Some((Span::Text(first), rest)) = spans.split_first() else {
        spans_to_typst(spans, out);
        return;
    };

    let text = first.trim_start();
    out.push_str(&first[..first.len() - text.len()]);
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if text.starts_with(['-', '+']) {
        out.push('\\');
        escape_text(text, out);
    } else if digits > 0 && text[digits..].starts_with('.') {
        out.push_str(&text[..digits]);
        out.push_str("\\.");
        escape_text(&text[digits + 1..], out);
    } else {
        escape_text(text, out);
    }
    spans_to_typst(rest, out);
}

fn spans_to_typst(spans: &[Span], out: &mut String) {
    for span in spans {
        span_to_typst(span, out);
    }
}

fn span_to_typst(span: &Span, out: &mut String) {
    match span {
        Span::Text(text) => escape_text(text, out),
        Span::Bold(inner) => wrap_spans("strong", inner, out),
        Span::Italic(inner) => wrap_spans("emph", inner, out),
        Span::Strikethrough(inner) => wrap_spans("strike", inner, out),
        Span::Code(text) => {
            // Code spans never contain backticks
            out.push('`');
            out.push_str(text);
            out.push('`');
        }
        Span::Link { url, content } => {
            out.push_str("#link(\"");
            push_string_literal(url, out);
            out.push_str("\")[");
            spans_to_typst(content, out);
            out.push(']');
        }
    }
}

fn wrap_spans(func: &str, inner: &[Span], out: &mut String) {
    out.push('#');
    out.push_str(func);
    out.push('[');
    spans_to_typst(inner, out);
    out.push(']');
}

/// Escape characters that Typst markup would interpret.
fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '~' | '=' | '/' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

/// Escape the body of a Typst string literal.
fn push_string_literal(text: &str, out: &mut String) {
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
}
