use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::block::{Block, List, Span, spans_are_blank};
use crate::config::{ClassConfig, Config};

/// Render blocks to HTML fragments, one per output element, in input order.
///
/// Paragraphs with no visible text are dropped, and a `LineBreak` only
/// becomes `<br>` once something has been emitted before it.
pub fn render(blocks: &[Block], config: &Config) -> Vec<String> {
    let mut elements = Vec::with_capacity(blocks.len());

    for block in blocks {
        match block {
            Block::LineBreak if elements.is_empty() => {}
            Block::Paragraph { content } if spans_are_blank(content) => {}
            _ => {
                let mut out = String::new();
                emit_block(block, config, &mut out);
                elements.push(out);
            }
        }
    }

    elements
}

/// Render blocks to a single HTML string, inside the configured wrapper `<div>`.
pub fn blocks_to_html(blocks: &[Block], config: &Config) -> String {
    let elements = render(blocks, config);
    let wrapper = &config.html.wrapper_class;

    let mut out = String::new();
    if !wrapper.is_empty() {
        open_tag("div", wrapper, &mut out);
        out.push('\n');
    }
    for element in &elements {
        out.push_str(element);
        out.push('\n');
    }
    if !wrapper.is_empty() {
        out.push_str("</div>\n");
    }
    out
}

/// Wrap an HTML body fragment into a minimal standalone document.
pub fn standalone_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        encode_text(title),
        body
    )
}

fn emit_block(block: &Block, config: &Config, out: &mut String) {
    let classes = &config.html.classes;
    match block {
        Block::Heading { level, text } => {
            let tag = format!("h{}", (*level).clamp(1, 3));
            open_tag(&tag, classes.heading(*level), out);
            out.push_str(&encode_text(text));
            close_tag(&tag, out);
        }
        Block::Paragraph { content } => {
            open_tag("p", &classes.paragraph, out);
            spans_to_html(content, config, out);
            close_tag("p", out);
        }
        Block::List(list) => list_to_html(list, config, out),
        Block::Blockquote { content } => {
            open_tag("blockquote", &classes.blockquote, out);
            spans_to_html(content, config, out);
            close_tag("blockquote", out);
        }
        Block::CodeBlock { language, lines } => {
            open_tag("pre", &classes.pre, out);
            let code_class = code_block_class(classes, language.as_deref());
            open_tag("code", &code_class, out);
            out.push_str(&encode_text(&lines.join("\n")));
            close_tag("code", out);
            close_tag("pre", out);
        }
        Block::Rule => open_tag("hr", &classes.rule, out),
        Block::LineBreak => out.push_str("<br>"),
    }
}

fn code_block_class(classes: &ClassConfig, language: Option<&str>) -> String {
    let mut class = classes.code_block.clone();
    if let Some(lang) = language {
        if !class.is_empty() {
            class.push(' ');
        }
        class.push_str("language-");
        class.push_str(lang);
    }
    class
}

fn list_to_html(list: &List, config: &Config, out: &mut String) {
    let classes = &config.html.classes;
    let (tag, class) = if list.is_ordered() {
        ("ol", &classes.ordered_list)
    } else {
        ("ul", &classes.unordered_list)
    };

    open_tag(tag, class, out);
    for item in &list.items {
        open_tag("li", &classes.list_item, out);
        spans_to_html(&item.content, config, out);
        close_tag("li", out);
    }
    close_tag(tag, out);
}

fn spans_to_html(spans: &[Span], config: &Config, out: &mut String) {
    for span in spans {
        span_to_html(span, config, out);
    }
}

fn span_to_html(span: &Span, config: &Config, out: &mut String) {
    let classes = &config.html.classes;
    match span {
        Span::Text(text) => out.push_str(&encode_text(text)),
        Span::Code(code) => {
            open_tag("code", &classes.code, out);
            out.push_str(&encode_text(code));
            close_tag("code", out);
        }
        Span::Bold(inner) => wrap_spans("strong", &classes.strong, inner, config, out),
        Span::Italic(inner) => wrap_spans("em", &classes.em, inner, config, out),
        Span::Strikethrough(inner) => wrap_spans("del", &classes.del, inner, config, out),
        Span::Link { url, content } => {
            out.push_str("<a href=\"");
            out.push_str(&encode_double_quoted_attribute(url));
            out.push('"');
            push_class(&classes.link, out);
            if config.links.new_tab {
                out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
            }
            out.push('>');
            spans_to_html(content, config, out);
            close_tag("a", out);
        }
    }
}

fn wrap_spans(tag: &str, class: &str, inner: &[Span], config: &Config, out: &mut String) {
    open_tag(tag, class, out);
    spans_to_html(inner, config, out);
    close_tag(tag, out);
}

fn open_tag(tag: &str, class: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    push_class(class, out);
    out.push('>');
}

fn close_tag(tag: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn push_class(class: &str, out: &mut String) {
    if !class.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&encode_double_quoted_attribute(class));
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HtmlConfig;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn plain() -> Config {
        Config {
            html: HtmlConfig::unstyled(),
            ..Config::default()
        }
    }

    fn html(markdown: &str) -> Vec<String> {
        render(&parse(markdown), &plain())
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(html("").is_empty());
        assert_eq!(blocks_to_html(&[], &plain()), "");
    }

    #[test]
    fn headings() {
        assert_eq!(
            html("# One\n## Two\n### Three"),
            vec!["<h1>One</h1>", "<h2>Two</h2>", "<h3>Three</h3>"]
        );
    }

    #[test]
    fn paragraph_with_inline_markup() {
        assert_eq!(
            html("**bold**, *it*, ~~no~~ and `x`"),
            vec![
                "<p><strong>bold</strong>, <em>it</em>, <del>no</del> and <code>x</code></p>"
            ]
        );
    }

    #[test]
    fn lists_wrap_items() {
        assert_eq!(
            html("- a\n- b\n1. c"),
            vec!["<ul><li>a</li><li>b</li></ul>", "<ol><li>c</li></ol>"]
        );
    }

    #[test]
    fn blockquote_and_rule() {
        assert_eq!(
            html("> quoted\n---"),
            vec!["<blockquote>quoted</blockquote>", "<hr>"]
        );
    }

    #[test]
    fn code_block_is_literal_and_escaped() {
        assert_eq!(
            html("```html\n<b>**x**</b>\n  indented\n```"),
            vec!["<pre><code class=\"language-html\">&lt;b&gt;**x**&lt;/b&gt;\n  indented</code></pre>"]
        );
    }

    #[test]
    fn code_block_class_joins_language_hint() {
        let config = Config::default();
        let out = render(&parse("```js\nlet a;\n```"), &config);
        assert_eq!(
            out,
            vec!["<pre class=\"bg-muted p-4 rounded-lg overflow-x-auto mb-4\"><code class=\"text-sm language-js\">let a;</code></pre>"]
        );
    }

    #[test]
    fn links_open_in_new_tab() {
        assert_eq!(
            html("[site](https://example.com/?a=1&b=\"2\")"),
            vec![
                "<p><a href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\" target=\"_blank\" rel=\"noopener noreferrer\">site</a></p>"
            ]
        );
    }

    #[test]
    fn same_tab_links_when_configured() {
        let mut config = plain();
        config.links.new_tab = false;
        assert_eq!(
            render(&parse("https://example.com"), &config),
            vec!["<p><a href=\"https://example.com\">https://example.com</a></p>"]
        );
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(
            html("<script>alert(1)</script> & more"),
            vec!["<p>&lt;script&gt;alert(1)&lt;/script&gt; &amp; more</p>"]
        );
        assert_eq!(html("# a < b"), vec!["<h1>a &lt; b</h1>"]);
    }

    #[test]
    fn line_breaks_between_blocks() {
        assert_eq!(html("one\n\ntwo"), vec!["<p>one</p>", "<br>", "<p>two</p>"]);
    }

    #[test]
    fn no_leading_break() {
        let blocks = vec![
            Block::LineBreak,
            Block::Paragraph {
                content: vec![Span::Text("x".to_string())],
            },
        ];
        assert_eq!(render(&blocks, &plain()), vec!["<p>x</p>"]);
    }

    #[test]
    fn blank_paragraph_is_dropped() {
        let blocks = vec![Block::Paragraph {
            content: vec![Span::Text("   ".to_string())],
        }];
        assert!(render(&blocks, &plain()).is_empty());
    }

    #[test]
    fn blank_code_and_link_paragraphs_are_kept() {
        assert_eq!(html("` `"), vec!["<p><code> </code></p>"]);
        assert_eq!(
            html("[ ](u)"),
            vec!["<p><a href=\"u\" target=\"_blank\" rel=\"noopener noreferrer\"> </a></p>"]
        );
    }

    #[test]
    fn default_classes_and_wrapper() {
        let out = blocks_to_html(&parse("Hello"), &Config::default());
        assert_eq!(
            out,
            "<div class=\"prose prose-sm dark:prose-invert max-w-none\">\n<p class=\"mb-4 leading-relaxed\">Hello</p>\n</div>\n"
        );
    }

    #[test]
    fn standalone_document_escapes_title() {
        let doc = standalone_document("a & b", "<p>x</p>\n");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>a &amp; b</title>"));
        assert!(doc.contains("<body>\n<p>x</p>\n</body>"));
    }
}
