//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
///
/// ```toml
/// [logging]
/// level = "info"
///
/// [plugins.turing]
/// token = "..."
/// groupNums = [123456]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarunoConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Raw per-plugin sections, keyed by plugin name.
    #[serde(default)]
    pub plugins: BTreeMap<String, Value>,
}

impl HarunoConfig {
    /// Deserializes the section of the named plugin.
    ///
    /// An absent (or null) section yields `T::default()`.
    pub fn plugin<T>(&self, name: &str) -> ConfigResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.plugins.get(name) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(section) => serde_json::from_value(section.clone())
                .map_err(|e| ConfigError::plugin(name, e.to_string())),
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, required when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-target level overrides, e.g. `haruno_turing = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,

    /// Include thread IDs in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    #[serde(default)]
    pub file_location: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level name as used in filter directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to the corresponding `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to compact without it.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}
