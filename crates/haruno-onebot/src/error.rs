//! Error types for message and event parsing.

use thiserror::Error;

/// Errors that can occur while decoding a message body or an event.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A `[CQ:` opener without a closing `]`.
    #[error("unterminated CQ code starting at offset {offset}")]
    UnterminatedCode {
        /// Character offset of the `[CQ:` opener.
        offset: usize,
    },

    /// The CQ code type is empty or contains characters outside `[A-Za-z0-9_.-]`.
    #[error("invalid CQ code type {kind:?} at offset {offset}")]
    InvalidCodeType {
        /// The offending type tag.
        kind: String,
        /// Character offset of the `[CQ:` opener.
        offset: usize,
    },

    /// A CQ code parameter without `=` or with an empty key.
    #[error("malformed parameter {param:?} in CQ code `{kind}`")]
    MalformedParam {
        /// The CQ code type the parameter belongs to.
        kind: String,
        /// The raw parameter text.
        param: String,
    },

    /// The body or event is not valid JSON of the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
