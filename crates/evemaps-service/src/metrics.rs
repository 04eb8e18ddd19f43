//! Prometheus metrics for the route service.
//!
//! Uses a process-global recorder so the `metrics` macros work from any
//! module. Initialization is optional: when the recorder is not installed
//! the recording helpers become no-ops and the scrape endpoint says so.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Metrics configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether the Prometheus recorder should be installed.
    pub enabled: bool,
    /// Path the scrape endpoint is served on.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` and `METRICS_PATH` from the environment.
    /// Anything other than `METRICS_ENABLED=false` leaves metrics on.
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|value| value.to_lowercase() != "false")
            .unwrap_or(true);
        let path = std::env::var("METRICS_PATH").unwrap_or_else(|_| "/metrics".to_string());
        Self { enabled, path }
    }
}

#[derive(Debug)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "metrics are disabled by configuration"),
            Self::AlreadyInitialized => write!(f, "metrics recorder is already initialized"),
            Self::InstallFailed(detail) => {
                write!(f, "failed to install metrics recorder: {detail}")
            }
        }
    }
}

impl std::error::Error for MetricsError {}

/// Install the global Prometheus recorder. Call once at startup.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|error| MetricsError::InstallFailed(error.to_string()))?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;
    Ok(())
}

pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render the current metric registry in Prometheus text format.
pub async fn metrics_handler() -> String {
    match prometheus_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

pub fn record_route_calculated() {
    metrics::counter!("evemaps_routes_calculated_total").increment(1);
}

pub fn record_route_failed(reason: &str) {
    metrics::counter!("evemaps_routes_failed_total", "reason" => reason.to_string()).increment(1);
}

pub fn record_route_jumps(jumps: usize) {
    metrics::histogram!("evemaps_route_jumps").record(jumps as f64);
}

pub fn record_route_cache_hit() {
    metrics::counter!("evemaps_route_cache_hits_total").increment(1);
}

pub fn record_search_performed(matches: usize) {
    metrics::counter!("evemaps_searches_total").increment(1);
    metrics::histogram!("evemaps_search_results").record(matches as f64);
}

pub fn record_systems_query(mode: &str) {
    metrics::counter!("evemaps_systems_queries_total", "mode" => mode.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serves_metrics() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn error_messages_name_the_cause() {
        assert!(MetricsError::Disabled.to_string().contains("disabled"));
        assert!(
            MetricsError::AlreadyInitialized
                .to_string()
                .contains("already")
        );
        assert!(
            MetricsError::InstallFailed("boom".to_string())
                .to_string()
                .contains("boom")
        );
    }

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        record_route_calculated();
        record_route_failed("test");
        record_route_jumps(3);
        record_route_cache_hit();
        record_search_performed(2);
        record_systems_query("stargate");
    }
}
