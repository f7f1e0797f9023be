/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Code(String),
    Bold(Vec<Span>),
    Italic(Vec<Span>),
    Strikethrough(Vec<Span>),
    /// Link label is kept literal: `content` holds a single `Text` span.
    Link {
        url: String,
        content: Vec<Span>,
    },
}

impl Span {
    /// Concatenated literal text of this span and its children, without markup.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Span::Text(text) | Span::Code(text) => out.push_str(text),
            Span::Bold(inner) | Span::Italic(inner) | Span::Strikethrough(inner) => {
                for span in inner {
                    span.push_plain_text(out);
                }
            }
            Span::Link { content, .. } => {
                for span in content {
                    span.push_plain_text(out);
                }
            }
        }
    }
}

/// Concatenated literal text of a span sequence.
pub fn spans_plain_text(spans: &[Span]) -> String {
    spans.iter().map(Span::plain_text).collect()
}

/// True when the spans are only whitespace text. Code spans and links count
/// as content even when their text is blank.
pub fn spans_are_blank(spans: &[Span]) -> bool {
    spans.iter().all(|span| match span {
        Span::Text(text) => text.trim().is_empty(),
        _ => false,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// A single list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub content: Vec<Span>,
}

/// A run of adjacent list items sharing one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.kind == ListKind::Ordered
    }
}

/// Block-level elements parsed from a chat reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Heading text is literal; only levels 1 to 3 are produced.
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        content: Vec<Span>,
    },
    List(List),
    Blockquote {
        content: Vec<Span>,
    },
    CodeBlock {
        language: Option<String>,
        lines: Vec<String>,
    },
    Rule,
    LineBreak,
}
