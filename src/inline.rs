use std::collections::HashMap;

use crate::block::Span;

const TICK: u8 = b'`';
const TILDE: u8 = b'~';
const STRIKE: &str = "~~";
static AUTOLINK_SCHEMES: [&str; 2] = ["https://", "http://"];

/// Longest delimiter run that opens emphasis (`***`).
const MAX_RUN: usize = 3;

/// Parse inline markup in a single line of text into spans.
///
/// The line is scanned once, left to right. At each position the constructs
/// are tried in precedence order (code, bold, italic, strikethrough, link,
/// auto-link) and the first one that matches from that position wins.
/// Anything else is collected into literal `Span::Text` runs.
///
/// Code spans are raw zones: their content is never formatted, and emphasis
/// closers inside them are not seen by an enclosing bold or italic. Emphasis
/// of the other width may nest on either side, so `*a **b** c*` is an italic
/// holding a bold.
pub fn format(text: &str) -> Vec<Span> {
    let mut cur = Cursor::new(text);
    let mut out = Vec::new();
    let mut text_start = 0;

    while !cur.eof() {
        let start = cur.pos();
        if let Some(span) = try_construct(&mut cur) {
            flush_text(&mut out, &text[text_start..start]);
            out.push(span);
            text_start = cur.pos();
            continue;
        }
        cur.bump_char();
    }

    flush_text(&mut out, &text[text_start..]);
    out
}

fn flush_text(out: &mut Vec<Span>, text: &str) {
    if !text.is_empty() {
        out.push(Span::Text(text.to_string()));
    }
}

fn try_construct(cur: &mut Cursor<'_>) -> Option<Span> {
    try_code_span(cur)
        .or_else(|| try_strong(cur, b'*'))
        .or_else(|| try_strong(cur, b'_'))
        .or_else(|| try_emphasis(cur, b'*'))
        .or_else(|| try_emphasis(cur, b'_'))
        .or_else(|| try_strikethrough(cur))
        .or_else(|| try_link(cur))
        .or_else(|| try_autolink(cur))
}

/// `` `code` ``; content must be non-empty.
fn try_code_span(cur: &mut Cursor<'_>) -> Option<Span> {
    let start = cur.pos();
    let end = cur.code_span_end(start)?;
    let code = cur.slice(start + 1, end - 1).to_string();
    cur.seek(end);
    Some(Span::Code(code))
}

/// `**bold**` / `__bold__`, or the triple run `***both***` which nests an
/// italic inside the bold.
fn try_strong(cur: &mut Cursor<'_>, delim: u8) -> Option<Span> {
    if cur.starts_with(&[delim; 3]) {
        if let Some(inner) = delimited(cur, delim, 3) {
            return Some(Span::Bold(vec![Span::Italic(format(inner))]));
        }
    }
    if cur.starts_with(&[delim; 2]) {
        if let Some(inner) = delimited(cur, delim, 2) {
            return Some(Span::Bold(format(inner)));
        }
    }
    None
}

/// `*italic*` / `_italic_`
fn try_emphasis(cur: &mut Cursor<'_>, delim: u8) -> Option<Span> {
    if cur.peek() != Some(delim) {
        return None;
    }
    delimited(cur, delim, 1).map(|inner| Span::Italic(format(inner)))
}

/// `~~struck~~`; content may not contain a tilde.
fn try_strikethrough(cur: &mut Cursor<'_>) -> Option<Span> {
    if !cur.starts_with(STRIKE.as_bytes()) {
        return None;
    }
    let inner_start = cur.pos() + STRIKE.len();
    let inner_end = cur.find_byte(TILDE, inner_start)?;
    if inner_end == inner_start || cur.byte_at(inner_end + 1) != Some(TILDE) {
        return None;
    }
    let inner = cur.slice(inner_start, inner_end);
    cur.seek(inner_end + STRIKE.len());
    Some(Span::Strikethrough(format(inner)))
}

/// Finds the closer for a `width`-long opener of `delim` at the cursor. On
/// success the cursor moves past the closer and the non-empty content is
/// returned.
fn delimited<'a>(cur: &mut Cursor<'a>, delim: u8, width: usize) -> Option<&'a str> {
    let inner_start = cur.pos() + width;
    let inner_end = cur.find_closer(delim, width, inner_start)?;
    if inner_end == inner_start {
        return None;
    }
    let inner = cur.slice(inner_start, inner_end);
    cur.seek(inner_end + width);
    Some(inner)
}

/// `[label](url)`; the label is literal.
fn try_link(cur: &mut Cursor<'_>) -> Option<Span> {
    if cur.peek() != Some(b'[') {
        return None;
    }
    let label_start = cur.pos() + 1;
    let label_end = cur.find_byte(b']', label_start)?;
    if label_end == label_start || cur.byte_at(label_end + 1) != Some(b'(') {
        return None;
    }
    let url_start = label_end + 2;
    let url_end = cur.find_byte(b')', url_start)?;
    if url_end == url_start {
        return None;
    }

    let label = cur.slice(label_start, label_end).to_string();
    let url = cur.slice(url_start, url_end).to_string();
    cur.seek(url_end + 1);
    Some(Span::Link {
        url,
        content: vec![Span::Text(label)],
    })
}

/// Bare `http://` or `https://` URL, running to the next whitespace.
fn try_autolink(cur: &mut Cursor<'_>) -> Option<Span> {
    let scheme = AUTOLINK_SCHEMES
        .iter()
        .find(|scheme| cur.starts_with(scheme.as_bytes()))?;

    let start = cur.pos();
    let rest = cur.slice(start, cur.len());
    let end = start + rest.find(char::is_whitespace).unwrap_or(rest.len());
    if end == start + scheme.len() {
        return None;
    }

    let url = cur.slice(start, end).to_string();
    cur.seek(end);
    Some(Span::Link {
        url: url.clone(),
        content: vec![Span::Text(url)],
    })
}

/// Byte cursor over a line of inline text.
///
/// All delimiters are ASCII, so every position the cursor stops at is a
/// char boundary as long as literal text is consumed with `bump_char`.
///
/// Searches are memoized per line, so an opener that never closes costs one
/// scan no matter how many times it is retried.
struct Cursor<'a> {
    s: &'a str,
    i: usize,
    /// Last `find_byte` per needle: `(from, result)`.
    found: HashMap<u8, (usize, Option<usize>)>,
    /// `find_closer` results by `(delim, width, from)`.
    closers: HashMap<(u8, usize, usize), Option<usize>>,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            s,
            i: 0,
            found: HashMap::new(),
            closers: HashMap::new(),
        }
    }

    fn pos(&self) -> usize {
        self.i
    }

    fn len(&self) -> usize {
        self.s.len()
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    fn peek(&self) -> Option<u8> {
        self.byte_at(self.i)
    }

    fn byte_at(&self, at: usize) -> Option<u8> {
        self.s.as_bytes().get(at).copied()
    }

    fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i..].starts_with(pat)
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.s[start..end]
    }

    fn seek(&mut self, to: usize) {
        self.i = to;
    }

    /// Advances past one whole character.
    fn bump_char(&mut self) {
        let width = self.s[self.i..].chars().next().map_or(1, char::len_utf8);
        self.i += width;
    }

    fn find_byte(&mut self, needle: u8, from: usize) -> Option<usize> {
        if let Some(&(last_from, last)) = self.found.get(&needle) {
            if from >= last_from && last.is_none_or(|at| from <= at) {
                return last;
            }
        }
        let found = self
            .s
            .as_bytes()
            .get(from..)
            .and_then(|rest| rest.iter().position(|&b| b == needle))
            .map(|offset| from + offset);
        self.found.insert(needle, (from, found));
        found
    }

    /// End (past the closing tick) of a complete, non-empty code span
    /// opening at `at`.
    fn code_span_end(&mut self, at: usize) -> Option<usize> {
        if self.byte_at(at) != Some(TICK) {
            return None;
        }
        let close = self.find_byte(TICK, at + 1)?;
        (close > at + 1).then_some(close + 1)
    }

    /// Length of the run of `delim` at `at`, counted up to one past `MAX_RUN`.
    fn run_len(&self, delim: u8, at: usize) -> usize {
        self.s.as_bytes()[at..]
            .iter()
            .take(MAX_RUN + 1)
            .take_while(|&&b| b == delim)
            .count()
    }

    /// Start of the run closing a `width`-long opener of `delim`, searching
    /// from `from`.
    ///
    /// Complete code spans are skipped. A run of another width that opens
    /// and closes its own emphasis is skipped whole, so nested emphasis
    /// never lends its delimiters to the outer one. A wider run that closes
    /// nothing closes this opener with its first `width` bytes.
    fn find_closer(&mut self, delim: u8, width: usize, from: usize) -> Option<usize> {
        if let Some(&closer) = self.closers.get(&(delim, width, from)) {
            return closer;
        }
        let closer = self.scan_closer(delim, width, from);
        self.closers.insert((delim, width, from), closer);
        closer
    }

    fn scan_closer(&mut self, delim: u8, width: usize, from: usize) -> Option<usize> {
        let mut i = from;
        while i < self.len() {
            if let Some(end) = self.code_span_end(i) {
                i = end;
                continue;
            }
            if self.s.as_bytes()[i] != delim {
                i += 1;
                continue;
            }

            let run = self.run_len(delim, i);
            if run == width {
                return Some(i);
            }
            match self.nested_end(delim, run, i) {
                Some(end) => i = end,
                None if run > width => return Some(i),
                None => i += run,
            }
        }
        None
    }

    /// End of the emphasis opened by the `run`-long run of `delim` at `at`,
    /// if that run opens one.
    fn nested_end(&mut self, delim: u8, run: usize, at: usize) -> Option<usize> {
        if run > MAX_RUN {
            return None;
        }
        let inner_start = at + run;
        let close = self.find_closer(delim, run, inner_start)?;
        (close > inner_start).then_some(close + run)
    }
}
