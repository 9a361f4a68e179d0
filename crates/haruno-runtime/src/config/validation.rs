//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{HarunoConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HarunoConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.output = \"file\" requires logging.file_path",
        ));
    }

    if let Some(target) = logging.filters.keys().find(|t| t.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid logging filter target: {target:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HarunoConfig::default()).is_ok());
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = HarunoConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.logging.file_path = Some("logs/haruno.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_blank_filter_target() {
        let mut config = HarunoConfig::default();
        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
