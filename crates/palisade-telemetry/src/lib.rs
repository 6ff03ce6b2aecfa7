//! Observability for Palisade.
//!
//! - **Logging**: structured JSON or pretty output via `tracing-subscriber`
//! - **Metrics**: Prometheus-format counters and histograms via `metrics`
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `palisade_validations_total` | Counter | `action`, `outcome` | Validations by outcome |
//! | `palisade_validation_errors_total` | Counter | `action`, `code` | Normalized errors by code |
//! | `palisade_validation_duration_seconds` | Histogram | `action` | Validation latency |
//!
//! # Example
//!
//! ```no_run
//! use palisade_config::PalisadeConfig;
//! use palisade_telemetry::{init_telemetry, render_metrics, TelemetryConfig};
//!
//! let config = PalisadeConfig::default();
//! init_telemetry(&TelemetryConfig::from(&config)).unwrap();
//!
//! // Later, from a scrape endpoint:
//! let body = render_metrics().unwrap_or_default();
//! # let _ = body;
//! ```

#![doc(html_root_url = "https://docs.rs/palisade-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, render_metrics, MetricsConfig};

use palisade_config::PalisadeConfig;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl From<&PalisadeConfig> for TelemetryConfig {
    fn from(config: &PalisadeConfig) -> Self {
        Self {
            logging: LogConfig::from(&config.logging),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_config::LogFormat;

    #[test]
    fn test_config_from_palisade_config() {
        let mut config = PalisadeConfig::default();
        config.logging.format = LogFormat::Pretty;
        config.logging.level = "trace".to_string();

        let telemetry = TelemetryConfig::from(&config);
        assert!(!telemetry.logging.json_format);
        assert_eq!(telemetry.logging.level, "trace");
        assert!(telemetry.metrics.enabled);
    }
}
