//! haruno runtime - ambient services shared by haruno plugins.
//!
//! This crate provides:
//! - Layered configuration loading ([`ConfigLoader`], [`HarunoConfig`])
//! - Logging configuration ([`LoggingBuilder`], [`logging::init_from_config`])
//!
//! ```rust,ignore
//! use haruno_runtime::{ConfigLoader, logging};
//!
//! let config = ConfigLoader::new().load()?;
//! logging::init_from_config(&config.logging);
//! ```

pub mod config;
pub mod logging;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, HarunoConfig, LogFormat, LogLevel, LogOutput,
    LoggingConfig, Profile,
};
pub use logging::LoggingBuilder;

