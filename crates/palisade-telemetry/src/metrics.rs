//! Prometheus metrics for validation.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `palisade_validations_total` | Counter | `action`, `outcome` | Validations by outcome |
//! | `palisade_validation_errors_total` | Counter | `action`, `code` | Normalized errors by code |
//! | `palisade_validation_duration_seconds` | Histogram | `action` | Engine and normalizer time |
//!
//! Recording functions are no-ops until a recorder is installed, so the
//! middleware calls them unconditionally.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Validations by outcome.
pub const VALIDATIONS_TOTAL: &str = "palisade_validations_total";

/// Normalized errors by code.
pub const VALIDATION_ERRORS_TOTAL: &str = "palisade_validation_errors_total";

/// Time spent validating and normalizing.
pub const VALIDATION_DURATION_SECONDS: &str = "palisade_validation_duration_seconds";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for validation duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 50µs .. 100ms
            duration_buckets: vec![0.000_05, 0.000_1, 0.000_25, 0.000_5, 0.001, 0.002_5, 0.005, 0.01, 0.025, 0.1],
        }
    }
}

/// Installs the Prometheus recorder. No HTTP listener is started; use
/// [`render_metrics`] to expose the text format.
///
/// Calling this again after a successful install is a no-op.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if the buckets are invalid or
/// another recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled || METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(VALIDATION_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

/// Returns the global metrics handle if initialized.
pub fn metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Renders metrics in Prometheus format, or `None` before [`init_metrics`].
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(VALIDATIONS_TOTAL, "Validated actions by outcome");
    describe_counter!(VALIDATION_ERRORS_TOTAL, "Normalized validation errors by code");
    describe_histogram!(
        VALIDATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent validating and normalizing a payload"
    );
}

/// Records one validated action.
///
/// `outcome` is one of `skipped`, `passed` or `rejected`.
pub fn record_validation(action: &str, outcome: &'static str, duration: Duration) {
    counter!(
        VALIDATIONS_TOTAL,
        "action" => action.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(VALIDATION_DURATION_SECONDS, "action" => action.to_string()).record(duration.as_secs_f64());
}

/// Records one normalized error.
pub fn record_validation_error(action: &str, code: &str) {
    counter!(
        VALIDATION_ERRORS_TOTAL,
        "action" => action.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(config.duration_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_record_functions_dont_panic_without_recorder() {
        record_validation("createUser", "passed", Duration::from_micros(120));
        record_validation_error("createUser", "required");
    }

    #[test]
    fn test_disabled_is_noop() {
        let config = MetricsConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_init_and_render() {
        init_metrics(&MetricsConfig::default()).unwrap();
        init_metrics(&MetricsConfig::default()).unwrap();

        record_validation("renderCheck", "rejected", Duration::from_millis(1));
        record_validation_error("renderCheck", "notNumber");

        let rendered = render_metrics().unwrap();
        assert!(rendered.contains(VALIDATIONS_TOTAL));
        assert!(rendered.contains("code=\"notNumber\""));
    }
}
