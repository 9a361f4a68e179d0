//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files (`haruno.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`haruno.yaml`, `haruno.yml`, etc.)
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic base configuration ([`ConfigLoader::merge`])
//! 3. Profile-specific config file (`haruno.{profile}.toml` / `haruno.{profile}.yaml`)
//! 4. Main config file (`haruno.toml` / `config.toml` / ...)
//! 5. Environment variables (`HARUNO_*`)
//! 6. Partial overrides ([`ConfigLoader::override_with`])
//!
//! Exactly one main config file is read: the first match in the first
//! search path that has one.
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `HARUNO_` prefix with `__` as separator:
//!
//! - `HARUNO_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `HARUNO_PLUGINS__TURING__TOKEN=xxx` → `plugins.turing.token = "xxx"`
//!
//! # Example
//!
//! ```rust,ignore
//! use haruno_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/haruno.toml")
//!     .with_env()
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::{Figment, Provider};
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::HarunoConfig;
use super::validation::validate_config;

/// Environment variable prefix.
const ENV_PREFIX: &str = "HARUNO_";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads the profile from `HARUNO_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var("HARUNO_PROFILE")
            .map(|p| Self::from_name(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Base figment, merged right after the defaults.
    figment: Figment,
    /// Partial overrides, merged last.
    overrides: Figment,
    /// Configuration profile.
    profile: Profile,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::from_name(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a base configuration programmatically.
    ///
    /// Files and environment variables still take precedence over it.
    pub fn merge(mut self, config: HarunoConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Merges a partial provider on top of every other source.
    ///
    /// Only the keys the provider sets are overridden, e.g.
    /// `Serialized::default("logging.level", "trace")`.
    pub fn override_with<P: Provider>(mut self, provider: P) -> Self {
        self.overrides = self.overrides.merge(provider);
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<HarunoConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: HarunoConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            plugins = config.plugins.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(HarunoConfig::default()));

        let base = std::mem::take(&mut self.figment);
        figment = figment.merge(base);

        if let Some(path) = self.config_file.take() {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, &path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(
                Env::prefixed(ENV_PREFIX)
                    .split("__")
                    .map(|key| key.as_str().replace("__", ".").into()),
            );
        }

        let overrides = std::mem::take(&mut self.overrides);
        Ok(figment.merge(overrides))
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("haruno"));
        }
        paths
    }

    /// Common search logic for a single file format.
    ///
    /// Iterates `search_paths × base_names`, tries a profile-specific variant first, then the
    /// base file. Returns `(figment, true)` as soon as a base file is found, or
    /// `(figment, false)` if nothing was located.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                // Profile-specific: e.g. haruno.production.toml
                let profile_path =
                    search_path.join(format!("{stem}.{}.{ext}", self.profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = merge_fn(figment, &profile_path);
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    figment = merge_fn(figment, &base_path);
                    return (figment, true);
                }
            }
        }
        (figment, false)
    }

    /// Searches for and loads configuration files from search paths.
    fn load_config_files(&self, #[allow(unused_mut)] mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        #[allow(unused_mut)]
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["haruno.toml", "config.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["haruno.yaml", "haruno.yml", "config.yaml", "config.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!(paths = ?search_paths, "No configuration file found, using defaults");
        }
        figment
    }
}

/// Loads configuration from the default locations and environment.
pub fn load_config() -> ConfigResult<HarunoConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file plus environment.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<HarunoConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(all(test, feature = "toml-config"))]
mod tests {
    use figment::Jail;

    use super::*;
    use crate::config::{LogFormat, LogLevel};

    fn loader_in(jail: &Jail) -> ConfigLoader {
        ConfigLoader::new().search_path(jail.directory())
    }

    #[test]
    fn test_default_config() {
        Jail::expect_with(|jail| {
            let config = loader_in(jail).without_env().load().map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Info);
            assert!(config.plugins.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_load_main_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "haruno.toml",
                r#"
                [logging]
                level = "debug"

                [plugins.turing]
                name = "turing"
                token = "secret"
                groupNums = [123, 456]
                "#,
            )?;

            let config = loader_in(jail).without_env().load().map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Debug);
            let turing = &config.plugins["turing"];
            assert_eq!(turing["token"], "secret");
            assert_eq!(turing["groupNums"], serde_json::json!([123, 456]));
            Ok(())
        });
    }

    #[test]
    fn test_config_toml_fallback_name() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[logging]\nlevel = \"warn\"\n")?;
            let config = loader_in(jail).without_env().load().map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Warn);
            Ok(())
        });
    }

    #[test]
    fn test_only_first_main_file_is_read() {
        Jail::expect_with(|jail| {
            jail.create_file("haruno.toml", "[logging]\nlevel = \"error\"\n")?;
            jail.create_file("config.toml", "[logging]\nthread_ids = true\n")?;
            let config = loader_in(jail).without_env().load().map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Error);
            assert!(!config.logging.thread_ids);
            Ok(())
        });
    }

    #[test]
    fn test_profile_file() {
        Jail::expect_with(|jail| {
            jail.create_file("haruno.production.toml", "[logging]\nlevel = \"warn\"\n")?;
            jail.create_file("haruno.toml", "[logging]\nthread_ids = true\n")?;

            let config = loader_in(jail)
                .profile("prod")
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Warn);
            assert!(config.logging.thread_ids);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("haruno.toml", "[logging]\nlevel = \"debug\"\n")?;
            jail.set_env("HARUNO_LOGGING__LEVEL", "error");
            jail.set_env("HARUNO_PLUGINS__TURING__TOKEN", "from-env");

            let config = loader_in(jail).load().map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Error);
            assert_eq!(config.plugins["turing"]["token"], "from-env");
            Ok(())
        });
    }

    #[test]
    fn test_programmatic_base_yields_to_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "haruno.toml",
                "[logging]\nlevel = \"debug\"\nthread_ids = true\nformat = \"pretty\"\n",
            )?;
            let mut base = HarunoConfig::default();
            base.logging.level = LogLevel::Trace;
            base.logging.file_location = true;

            let config = loader_in(jail)
                .without_env()
                .merge(base)
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Debug);
            assert!(config.logging.thread_ids);
            assert_eq!(config.logging.format, LogFormat::Pretty);
            assert!(config.logging.file_location);
            Ok(())
        });
    }

    #[test]
    fn test_partial_override_keeps_file_fields() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "haruno.toml",
                "[logging]\nlevel = \"debug\"\nthread_ids = true\nformat = \"pretty\"\n",
            )?;
            jail.set_env("HARUNO_LOGGING__LEVEL", "warn");

            let config = loader_in(jail)
                .override_with(Serialized::default("logging.level", "trace"))
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Trace);
            assert!(config.logging.thread_ids);
            assert_eq!(config.logging.format, LogFormat::Pretty);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_missing_file() {
        Jail::expect_with(|jail| {
            let result = ConfigLoader::new()
                .file(jail.directory().join("missing.toml"))
                .without_env()
                .load();
            assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_logging_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("haruno.toml", "[logging]\noutput = \"file\"\n")?;
            let result = loader_in(jail).without_env().load();
            assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(Profile::from_name("PROD"), Profile::Production);
        assert_eq!(Profile::from_name("dev"), Profile::Development);
        assert_eq!(
            Profile::from_name("staging"),
            Profile::Custom("staging".into())
        );
        assert_eq!(Profile::Production.to_string(), "production");
    }
}
