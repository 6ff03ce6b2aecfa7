//! Configuration section types.
//!
//! Each section corresponds to a table in the configuration file. Every
//! section rejects unknown fields.

use indexmap::IndexMap;
use palisade_core::HandlerPolicy;
use palisade_schema::EngineOptions;
use serde::{Deserialize, Serialize};

// ============================================================================
// Validation
// ============================================================================

/// Instance-wide settings for the validation middleware.
///
/// # Example
///
/// ```
/// use palisade_config::ValidationConfig;
/// use palisade_core::HandlerPolicy;
///
/// let config = ValidationConfig::default();
/// assert_eq!(config.policy, HandlerPolicy::Bubble);
/// assert!(config.convert);
/// assert!(!config.abort_early);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// How handler results become an outcome.
    #[serde(default)]
    pub policy: HandlerPolicy,

    /// Stop at the first violation.
    #[serde(default)]
    pub abort_early: bool,

    /// Coerce values to the expected type.
    #[serde(default = "default_true")]
    pub convert: bool,

    /// Drop undeclared object keys.
    #[serde(default)]
    pub strip_unknown: bool,

    /// Keep undeclared object keys.
    #[serde(default)]
    pub allow_unknown: bool,

    /// Error code overrides, keyed by `category.rule`.
    #[serde(default)]
    pub messages: IndexMap<String, String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let engine = EngineOptions::default();
        Self {
            policy: HandlerPolicy::default(),
            abort_early: engine.abort_early,
            convert: engine.convert,
            strip_unknown: engine.strip_unknown,
            allow_unknown: engine.allow_unknown,
            messages: IndexMap::new(),
        }
    }
}

impl ValidationConfig {
    /// The engine options described by this section.
    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            abort_early: self.abort_early,
            convert: self.convert,
            strip_unknown: self.strip_unknown,
            allow_unknown: self.allow_unknown,
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (e.g. `info`, `palisade=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_defaults_match_engine() {
        let config = ValidationConfig::default();
        assert_eq!(config.engine_options(), EngineOptions::default());
        assert!(config.messages.is_empty());
    }

    #[test]
    fn test_validation_partial_toml() {
        let config: ValidationConfig = toml::from_str(
            r#"
            policy = "respond"
            abort_early = true

            [messages]
            "number.base" = "mustBeNumeric"
            "#,
        )
        .unwrap();

        assert_eq!(config.policy, HandlerPolicy::Respond);
        assert!(config.abort_early);
        assert!(config.convert);
        assert_eq!(config.messages.get("number.base").map(String::as_str), Some("mustBeNumeric"));
    }

    #[test]
    fn test_validation_rejects_unknown_fields() {
        let result: Result<ValidationConfig, _> = toml::from_str("coerce = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_defaults() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_serde() {
        let format: LogFormat = serde_json::from_str("\"pretty\"").unwrap();
        assert_eq!(format, LogFormat::Pretty);
        assert!(serde_json::from_str::<LogFormat>("\"xml\"").is_err());
    }
}
