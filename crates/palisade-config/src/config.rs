//! Root configuration type.

use palisade_core::Vocabulary;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, ValidationConfig};

/// Complete Palisade configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use palisade_config::PalisadeConfig;
///
/// let config = PalisadeConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PalisadeConfig {
    /// Validation middleware settings.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PalisadeConfig {
    /// Development preset: debug level, human-readable logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            validation: ValidationConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
                ..LoggingConfig::default()
            },
        }
    }

    /// Production preset: info level, JSON logs.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Checks values that deserialization cannot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the log level is empty
    /// - a message override names an unknown `category.rule`
    /// - a message override maps to an empty code
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        let standard = Vocabulary::standard();
        for (kind, code) in &self.validation.messages {
            if !standard.contains(kind) {
                return Err(ConfigError::invalid_value(
                    format!("validation.messages.{kind}"),
                    "unknown failure kind",
                ));
            }
            if code.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("validation.messages.{kind}"),
                    "error code must not be empty",
                ));
            }
        }

        Ok(())
    }
}
