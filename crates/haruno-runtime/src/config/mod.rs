//! Configuration module for the haruno runtime.
//!
//! Layered loading (defaults, files, environment) plus validation of the
//! shared settings. Plugin sections are kept as raw JSON and handed to each
//! plugin through [`HarunoConfig::plugin`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{HarunoConfig, LogFormat, LogLevel, LogOutput, LoggingConfig};
pub use validation::validate_config;
