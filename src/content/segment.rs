//! Segment extraction for message content
//!
//! Splits a block of message text into markdown text segments and
//! block-level annotations such as:
//!
//! ```text
//! <reasoning title="Step 1" expanded="true">
//! inner line 1
//! inner line 2
//! </reasoning>
//! ```
//!
//! Recognition is line oriented. An opening tag is only recognized at the
//! start of a trimmed line, attributes are only read from that same line,
//! and the closing tag must sit alone on its own line. Anything that fails
//! to match degrades to plain text; extraction never fails.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `<name ...>` at the start of a trimmed line. Characters after the first
/// `>` are ignored.
static TAG_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<([A-Za-z0-9_]+)(?:\s+([^>]+))?>").expect("tag head pattern is valid")
});

/// `key="value"` or `key='value'`
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z0-9_]+)=(?:"([^"]*)"|'([^']*)')"#).expect("attribute pattern is valid")
});

/// Plain text destined for the markdown renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Raw lines joined with `\n`
    pub content: String,
}

/// A recognized `<tag ...>...</tag>` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationSegment {
    /// Tag name as written after `<`
    pub tag_name: String,
    /// Attributes from the opening line; last occurrence of a key wins
    pub attributes: BTreeMap<String, String>,
    /// Lines between the delimiters, verbatim
    pub body: String,
}

impl AnnotationSegment {
    /// Look up an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// One unit of partitioned message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text(TextSegment),
    Annotation(AnnotationSegment),
}

impl Segment {
    /// Create a text segment
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text(TextSegment {
            content: content.into(),
        })
    }

    /// Create an annotation segment
    pub fn annotation<K, V>(
        tag_name: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
        body: impl Into<String>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Segment::Annotation(AnnotationSegment {
            tag_name: tag_name.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            body: body.into(),
        })
    }

    pub fn as_text(&self) -> Option<&TextSegment> {
        match self {
            Segment::Text(text) => Some(text),
            Segment::Annotation(_) => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationSegment> {
        match self {
            Segment::Annotation(annotation) => Some(annotation),
            Segment::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text(_))
    }
}

/// Partition `content` into ordered segments.
///
/// Pure and infallible: the same input always yields the same output, and
/// malformed or unterminated tags come back as text.
pub fn extract(content: &str) -> Vec<Segment> {
    segments(content).collect()
}

/// Lazy form of [`extract`]
pub fn segments(content: &str) -> Segments<'_> {
    Segments {
        lines: content.split('\n').collect(),
        cursor: 0,
    }
}

/// Iterator over the segments of a text block
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
}

impl Segments<'_> {
    /// Try to read an annotation starting at the cursor. The cursor only
    /// moves when both delimiters were found.
    fn take_annotation(&mut self) -> Option<Segment> {
        let open = self.lines[self.cursor].trim();
        if !open.starts_with('<') || open.starts_with("</") {
            return None;
        }

        let (tag_name, attributes) = parse_tag_head(open)?;
        let closing = format!("</{}>", tag_name);
        let body_start = self.cursor + 1;
        let close = self.lines[body_start..]
            .iter()
            .position(|line| line.trim() == closing)?
            + body_start;

        let body = self.lines[body_start..close].join("\n");
        self.cursor = close + 1;

        Some(Segment::Annotation(AnnotationSegment {
            tag_name: tag_name.to_string(),
            attributes,
            body,
        }))
    }

    /// Consume text lines from the cursor up to the next candidate tag line.
    /// Always advances; returns `None` when the run is blank.
    fn take_text(&mut self) -> Option<Segment> {
        let start = self.cursor;
        let mut end = start + 1;
        while end < self.lines.len() && !self.lines[end].trim_start().starts_with('<') {
            end += 1;
        }
        self.cursor = end;

        let content = self.lines[start..end].join("\n");
        if content.trim().is_empty() {
            None
        } else {
            Some(Segment::text(content))
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        while self.cursor < self.lines.len() {
            if let Some(annotation) = self.take_annotation() {
                return Some(annotation);
            }
            if let Some(text) = self.take_text() {
                return Some(text);
            }
        }
        None
    }
}

/// Parse `<name attr="value" ...>` into the tag name and its attributes
fn parse_tag_head(line: &str) -> Option<(&str, BTreeMap<String, String>)> {
    let caps = TAG_HEAD.captures(line)?;
    let tag_name = caps.get(1)?.as_str();

    let mut attributes = BTreeMap::new();
    if let Some(raw) = caps.get(2) {
        for attr in ATTRIBUTE.captures_iter(raw.as_str()) {
            let value = attr.get(2).or_else(|| attr.get(3)).map_or("", |m| m.as_str());
            attributes.insert(attr[1].to_string(), value.to_string());
        }
    }

    Some((tag_name, attributes))
}
