//! OneBot v11 message type.
//!
//! A [`Message`] is an ordered sequence of [`Segment`]s. Order is
//! significant: it is the display order of the message.
//!
//! # Message Formats
//!
//! OneBot v11 supports two message formats:
//! - **String format**: a CQ-coded string. This is what the host hands us in
//!   `ChatEvent::message` and what we hand back when sending.
//! - **Array format**: a JSON array of `{type, data}` segments.
//!
//! Parsing the string format is strict: a broken CQ code is a
//! [`ParseError`], not silently downgraded to text.
//!
//! # Example
//!
//! ```rust
//! use haruno_onebot::Message;
//!
//! let msg: Message = "[CQ:at,qq=10001000] hello".parse().unwrap();
//! assert!(msg.mentions(10001000));
//!
//! let reply = Message::new().at(42).text("hi &[there]");
//! assert_eq!(reply.to_cq_string(), "[CQ:at,qq=42]hi &amp;&#91;there&#93;");
//! ```

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParseError, ParseResult};
use crate::segment::{Segment, unescape_cq_text, unescape_cq_value};

const CQ_OPEN: [char; 4] = ['[', 'C', 'Q', ':'];

/// A OneBot v11 message composed of multiple segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    segments: Vec<Segment>,
}

// ============================================================================
// Serialization / Deserialization
// ============================================================================

impl Serialize for Message {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Always serialize as array format
        self.segments.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Support both array and string formats
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum MessageFormat {
            Array(Vec<Segment>),
            String(String),
        }

        match MessageFormat::deserialize(deserializer)? {
            MessageFormat::Array(segments) => Ok(Message { segments }),
            MessageFormat::String(cq_string) => {
                Message::parse(&cq_string).map_err(serde::de::Error::custom)
            }
        }
    }
}

// ============================================================================
// Constructors and Builders
// ============================================================================

impl Message {
    /// Creates a new empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message from a vector of segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Creates a message containing only plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::text(text)],
        }
    }

    /// Parses a CQ code string.
    pub fn parse(cq_string: &str) -> ParseResult<Self> {
        parse_cq_string(cq_string).map(Self::from_segments)
    }

    /// Parses the JSON array format.
    pub fn from_json(json: &str) -> ParseResult<Self> {
        Ok(Self::from_segments(serde_json::from_str(json)?))
    }

    /// Adds a text segment to the message.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::text(text));
        self
    }

    /// Adds an @mention segment.
    pub fn at(mut self, qq: i64) -> Self {
        self.segments.push(Segment::at(qq));
        self
    }

    /// Adds a raw segment.
    pub fn segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Adds a segment (mutable).
    pub fn push(&mut self, segment: Segment) -> &mut Self {
        self.segments.push(segment);
        self
    }
}

// ============================================================================
// Accessors and Conversion Methods
// ============================================================================

impl Message {
    /// Returns the segments as a slice.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns an iterator over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the message has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Converts the message into a vector of segments.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Iterates over the content of `text` segments in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::as_text)
    }

    /// Returns true if any segment is an @mention of `user_id`.
    pub fn mentions(&self, user_id: i64) -> bool {
        self.segments.iter().any(|seg| seg.mentions(user_id))
    }

    /// Converts the message to CQ code string format.
    pub fn to_cq_string(&self) -> String {
        self.segments.iter().map(Segment::to_cq_code).collect()
    }
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_cq_string())
    }
}

// ============================================================================
// From implementations
// ============================================================================

impl From<Vec<Segment>> for Message {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl From<Segment> for Message {
    fn from(segment: Segment) -> Self {
        Self {
            segments: vec![segment],
        }
    }
}

impl FromIterator<Segment> for Message {
    fn from_iter<T: IntoIterator<Item = Segment>>(iter: T) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Message {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

// ============================================================================
// CQ Code Parsing
// ============================================================================

/// Parses a CQ code string into a vector of segments.
///
/// This handles the string format where text and CQ codes are mixed:
/// ```text
/// Hello [CQ:face,id=178] World [CQ:at,qq=10001000]
/// ```
///
/// Unknown CQ code types are kept as generic segments. Structural damage
/// (no closing `]`, empty type, parameter without `=`) is an error.
pub fn parse_cq_string(input: &str) -> ParseResult<Vec<Segment>> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < len {
        if is_cq_open(&chars, pos) {
            let start = pos;
            let close = chars[pos..]
                .iter()
                .position(|&c| c == ']')
                .map(|i| pos + i)
                .ok_or(ParseError::UnterminatedCode { offset: start })?;

            let body: String = chars[start + CQ_OPEN.len()..close].iter().collect();
            segments.push(parse_cq_code(&body, start)?);
            pos = close + 1;
        } else {
            // Regular text - collect until the next CQ code or end
            let start = pos;
            while pos < len && !is_cq_open(&chars, pos) {
                pos += 1;
            }
            let text: String = chars[start..pos].iter().collect();
            segments.push(Segment::text(unescape_cq_text(&text)));
        }
    }

    Ok(segments)
}

fn is_cq_open(chars: &[char], pos: usize) -> bool {
    chars[pos..].starts_with(&CQ_OPEN)
}

/// Parses the inside of a CQ code (`type,key=value,...`).
fn parse_cq_code(body: &str, offset: usize) -> ParseResult<Segment> {
    let mut parts = body.split(',');
    let kind = parts.next().unwrap_or_default();

    let valid_kind = !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !valid_kind {
        return Err(ParseError::InvalidCodeType {
            kind: kind.to_string(),
            offset,
        });
    }

    let mut segment = Segment::new(kind);
    for param in parts {
        match param.split_once('=') {
            // A raw `[` inside a value means a nested, unclosed CQ code.
            Some((key, value)) if !key.is_empty() && !value.contains('[') => {
                segment = segment.param(key, unescape_cq_value(value));
            }
            _ => {
                return Err(ParseError::MalformedParam {
                    kind: kind.to_string(),
                    param: param.to_string(),
                });
            }
        }
    }
    Ok(segment)
}

// ============================================================================
// Tests
// ============================================================================
