//! OneBot v11 message segments.
//!
//! A segment is a single unit of content in a message: plain text, an
//! @mention, a face, an image, etc. Every segment is a type tag plus a flat
//! string-to-string data map, which keeps unknown segment kinds intact when
//! a message passes through the bot.
//!
//! The two kinds the reply pipeline actually reads have dedicated accessors:
//!
//! - `text` → [`Segment::as_text`]
//! - `at` → [`Segment::at_target`]
//!
//! # CQ Code Mapping
//!
//! - `text` → plain text (escaped, no CQ code)
//! - `at` → `[CQ:at,qq=10001000]`
//! - anything else → `[CQ:type,key=value,...]`
//!
//! # Example
//!
//! ```rust
//! use haruno_onebot::{AtTarget, Segment};
//!
//! let at = Segment::at(10001000);
//! assert_eq!(at.at_target(), Some(AtTarget::User(10001000)));
//! assert_eq!(at.to_cq_code(), "[CQ:at,qq=10001000]");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Segment type tag for plain text.
pub const TEXT: &str = "text";
/// Segment type tag for @mentions.
pub const AT: &str = "at";

/// A OneBot v11 message segment.
///
/// Serializes to the array-format shape `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment type tag ("text", "at", "face", ...).
    #[serde(rename = "type")]
    kind: String,
    /// Segment parameters.
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// Who an `at` segment points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtTarget {
    /// A specific user ID.
    User(i64),
    /// `qq=all`, mentioning everyone.
    All,
    /// The `qq` field is missing or not an integer.
    Invalid,
}

// ============================================================================
// Constructors
// ============================================================================

impl Segment {
    /// Creates a segment of the given kind with no data.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: BTreeMap::new(),
        }
    }

    /// Creates a segment of the given kind with the given data.
    pub fn with_data(kind: impl Into<String>, data: BTreeMap<String, String>) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Adds a data field (builder style).
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Creates a plain text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(TEXT).param("text", text)
    }

    /// Creates an @mention segment for a specific user.
    pub fn at(qq: i64) -> Self {
        Self::new(AT).param("qq", qq.to_string())
    }

    /// Creates an @all segment to mention everyone.
    pub fn at_all() -> Self {
        Self::new(AT).param("qq", "all")
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Segment {
    /// Returns the segment type tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the raw data map.
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Returns a single data field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Returns true if this is a `text` segment.
    pub fn is_text(&self) -> bool {
        self.kind == TEXT
    }

    /// Returns the text content if this is a `text` segment carrying a
    /// `text` field.
    pub fn as_text(&self) -> Option<&str> {
        if self.is_text() { self.get("text") } else { None }
    }

    /// Returns the mention target if this is an `at` segment.
    ///
    /// A missing or non-numeric `qq` value yields [`AtTarget::Invalid`]
    /// rather than an error.
    pub fn at_target(&self) -> Option<AtTarget> {
        if self.kind != AT {
            return None;
        }
        let target = match self.get("qq") {
            Some("all") => AtTarget::All,
            Some(qq) => qq.parse().map_or(AtTarget::Invalid, AtTarget::User),
            None => AtTarget::Invalid,
        };
        Some(target)
    }

    /// Returns true if this segment is an @mention of `user_id`.
    pub fn mentions(&self, user_id: i64) -> bool {
        self.at_target() == Some(AtTarget::User(user_id))
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(text) = self.as_text() {
            return f.write_str(text);
        }
        match self.at_target() {
            Some(AtTarget::All) => write!(f, "@全体成员"),
            Some(_) => write!(f, "@{}", self.get("qq").unwrap_or_default()),
            None => write!(f, "[{}]", self.kind),
        }
    }
}

// ============================================================================
// CQ Code Conversion
// ============================================================================

impl Segment {
    /// Converts this segment to a CQ code string.
    ///
    /// Text segments are returned as plain text (with escaping).
    /// Other segments are formatted as `[CQ:type,key=value,...]`.
    pub fn to_cq_code(&self) -> String {
        if self.is_text() {
            return escape_cq_text(self.get("text").unwrap_or_default());
        }

        let mut cq = format!("[CQ:{}", self.kind);
        for (key, value) in &self.data {
            cq.push(',');
            cq.push_str(key);
            cq.push('=');
            cq.push_str(&escape_cq_value(value));
        }
        cq.push(']');
        cq
    }
}

// ============================================================================
// CQ Code Escaping Utilities
// ============================================================================

/// Escapes special characters in plain text for CQ code format.
///
/// Escapes: `&` → `&amp;`, `[` → `&#91;`, `]` → `&#93;`
pub fn escape_cq_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('[', "&#91;")
        .replace(']', "&#93;")
}

/// Unescapes CQ code special characters back to plain text.
pub fn unescape_cq_text(text: &str) -> String {
    text.replace("&#91;", "[")
        .replace("&#93;", "]")
        .replace("&#44;", ",")
        .replace("&amp;", "&")
}

/// Escapes special characters in CQ code parameter values.
///
/// Escapes: `&` → `&amp;`, `[` → `&#91;`, `]` → `&#93;`, `,` → `&#44;`
pub fn escape_cq_value(value: &str) -> String {
    escape_cq_text(value).replace(',', "&#44;")
}

/// Unescapes CQ code parameter value special characters.
pub fn unescape_cq_value(value: &str) -> String {
    unescape_cq_text(value)
}

// ============================================================================
// Tests
// ============================================================================
