//! Lossless segmentation of a content unit into word and non-word segments
//!
//! Concatenating the text of every segment, in order, reproduces the input
//! byte for byte. Substitution relies on this: the renderer rewrites selected
//! word segments and copies everything else through untouched.
//!
//! A word is a maximal run of alphabetic characters. Markup is recognized so
//! that a word can never span into tag syntax:
//! - `<` followed by an ASCII letter, `/`, `!` or `?` opens a tag that runs to
//!   the next `>` outside quotes. A `<` that does not open a tag is punctuation.
//! - `<!-- ... -->` comments are a single markup segment.
//! - Character entities (`&amp;`, `&#233;`, `&#xE9;`) stay inside non-word text.
//! - The bodies of `<script>` and `<style>` elements are a single markup segment.

use std::sync::LazyLock;

use regex::Regex;

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("entity pattern is valid")
});

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// What a segment holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A maximal run of alphabetic characters
    Word,
    /// Whitespace, punctuation, digits and character entities
    Text,
    /// Tag syntax, comments and raw script/style bodies
    Markup,
}

/// A slice of the source content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Byte offset of the segment in the source
    pub start: usize,
}

impl<'a> Segment<'a> {
    /// Byte offset just past the segment
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }

    pub fn is_word(&self) -> bool {
        self.kind == SegmentKind::Word
    }
}

/// Split `content` into ordered segments
///
/// Lossless: concatenating the segment texts gives back `content`.
///
/// # Example
///
/// ```ignore
/// let segments = tokenize("<b>Hi</b> there");
/// assert_eq!(segments[1].text, "Hi");
/// assert!(segments[1].is_word());
/// assert_eq!(reconstruct(&segments), "<b>Hi</b> there");
/// ```
pub fn tokenize(content: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut text_start: Option<usize> = None;

    while pos < content.len() {
        let rest = &content[pos..];

        if let Some(len) = markup_len(rest) {
            flush_text(content, &mut text_start, pos, &mut segments);
            segments.push(Segment { kind: SegmentKind::Markup, text: &rest[..len], start: pos });
            pos += len;

            if let Some(element) = raw_text_element(&rest[..len]) {
                let body_len = raw_text_body_len(&content[pos..], element);
                if body_len > 0 {
                    segments.push(Segment {
                        kind: SegmentKind::Markup,
                        text: &content[pos..pos + body_len],
                        start: pos,
                    });
                    pos += body_len;
                }
            }
            continue;
        }

        if let Some(m) = ENTITY.find(rest) {
            text_start.get_or_insert(pos);
            pos += m.end();
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch.is_alphabetic() {
            flush_text(content, &mut text_start, pos, &mut segments);
            let len = word_len(rest);
            segments.push(Segment { kind: SegmentKind::Word, text: &rest[..len], start: pos });
            pos += len;
        } else {
            text_start.get_or_insert(pos);
            pos += ch.len_utf8();
        }
    }

    flush_text(content, &mut text_start, pos, &mut segments);
    segments
}

/// Concatenate segment texts back into a string
pub fn reconstruct(segments: &[Segment<'_>]) -> String {
    let mut out = String::with_capacity(segments.iter().map(|s| s.text.len()).sum());
    for segment in segments {
        out.push_str(segment.text);
    }
    out
}

fn flush_text<'a>(
    content: &'a str,
    text_start: &mut Option<usize>,
    end: usize,
    segments: &mut Vec<Segment<'a>>,
) {
    if let Some(start) = text_start.take() {
        if start < end {
            segments.push(Segment { kind: SegmentKind::Text, text: &content[start..end], start });
        }
    }
}

fn word_len(rest: &str) -> usize {
    rest.char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(rest.len())
}

/// Byte length of the tag or comment at the start of `rest`, if one starts there
fn markup_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    if rest.starts_with("<!--") {
        return rest[4..].find("-->").map(|i| 4 + i + 3);
    }

    match bytes.get(1) {
        Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?') => {}
        _ => return None,
    }

    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i + 1),
            None => {}
        }
    }
    None
}

/// Name of the raw-text element an opening tag starts, if any
fn raw_text_element(tag: &str) -> Option<&'static str> {
    if tag.ends_with("/>") {
        return None;
    }
    let lower = tag.to_ascii_lowercase();
    RAW_TEXT_ELEMENTS.into_iter().find(|name| {
        lower
            .strip_prefix('<')
            .and_then(|t| t.strip_prefix(name))
            .and_then(|t| t.chars().next())
            .is_some_and(|c| c == '>' || c.is_ascii_whitespace())
    })
}

/// Length of a raw-text body up to (not including) its closing tag
fn raw_text_body_len(rest: &str, element: &str) -> usize {
    let closing = format!("</{}", element);
    rest.to_ascii_lowercase().find(&closing).unwrap_or(rest.len())
}
