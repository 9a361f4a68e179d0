//! Error types for the Turing plugin.

use haruno_runtime::ConfigError;
use thiserror::Error;

/// Errors talking to the answer provider.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be built from the configured endpoint.
    #[error("invalid answer API URL {url}: {reason}")]
    InvalidUrl {
        /// The configured endpoint.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// The request failed before a response body was read.
    #[error("answer request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status and a body
    /// that is not an answer.
    #[error("answer API returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The response body is not a `{code, text}` object.
    #[error("failed to decode answer: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors loading the plugin.
#[derive(Debug, Error)]
pub enum TuringError {
    /// The plugin section could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The plugin section is present but unusable.
    #[error("invalid turing configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl TuringError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for answer provider calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for plugin loading.
pub type TuringResult<T> = Result<T, TuringError>;
