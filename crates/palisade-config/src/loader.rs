//! Layered configuration loader.
//!
//! Layers are applied in order, later ones overriding earlier ones:
//! built-in defaults, then a file or string (TOML or JSON), then
//! `PREFIX__SECTION__KEY` environment variables.

use std::env;
use std::fs;
use std::path::Path;

use palisade_core::HandlerPolicy;

use crate::{ConfigError, LogFormat, PalisadeConfig};

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use palisade_config::ConfigLoader;
///
/// # fn main() -> Result<(), palisade_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("palisade.toml")?
///     .with_env_prefix("PALISADE")
///     .load()?;
/// # let _ = config;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: PalisadeConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use palisade_config::{ConfigLoader, LogFormat};
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = PalisadeConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = PalisadeConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// contains unknown fields or has an unsupported extension.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Loads a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in the given format
    /// (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use palisade_config::ConfigLoader;
    /// use palisade_core::HandlerPolicy;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[validation]\npolicy = \"respond\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.validation.policy, HandlerPolicy::Respond);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Enables `PREFIX__SECTION__KEY` environment overrides, e.g.
    /// `PALISADE__VALIDATION__POLICY=respond`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment value cannot be parsed or the
    /// final configuration is invalid.
    pub fn load(mut self) -> Result<PalisadeConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without environment overrides or
    /// validation.
    #[must_use]
    pub fn load_unvalidated(self) -> PalisadeConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<PalisadeConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let validation = &mut self.config.validation;
        let logging = &mut self.config.logging;

        match parts.as_slice() {
            ["VALIDATION", "POLICY"] => {
                validation.policy = value
                    .parse::<HandlerPolicy>()
                    .map_err(|e| ConfigError::env_parse_error(key, e.to_string()))?;
            }
            ["VALIDATION", "ABORT_EARLY"] => validation.abort_early = bool_var(key, value)?,
            ["VALIDATION", "CONVERT"] => validation.convert = bool_var(key, value)?,
            ["VALIDATION", "STRIP_UNKNOWN"] => validation.strip_unknown = bool_var(key, value)?,
            ["VALIDATION", "ALLOW_UNKNOWN"] => validation.allow_unknown = bool_var(key, value)?,

            ["LOGGING", "ENABLED"] => logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env_parse_error(key, "expected 'json' or 'pretty'")),
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => logging.include_location = bool_var(key, value)?,

            _ => {}
        }

        Ok(())
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
