//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health report returned by the probe endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systems_loaded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_entries: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            systems_loaded: None,
            status_entries: None,
        }
    }

    pub fn ready(
        service: &str,
        version: &str,
        systems_loaded: usize,
        status_entries: usize,
    ) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            systems_loaded: Some(systems_loaded),
            status_entries: Some(status_entries),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {reason}"),
            service: service.to_string(),
            version: version.to_string(),
            systems_loaded: None,
            status_entries: None,
        }
    }
}

/// Liveness probe. Responds OK whenever the process can serve requests.
pub async fn health_live() -> Json<HealthStatus> {
    Json(HealthStatus::alive(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Readiness probe. Forces the universe dataset to load on first call so a
/// freshly started instance warms up before taking traffic.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.universe().get() {
        Ok(universe) if !universe.is_empty() => (
            StatusCode::OK,
            Json(HealthStatus::ready(
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                universe.len(),
                state.status().len(),
            )),
        ),
        Ok(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus::not_ready(
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                "universe dataset is empty",
            )),
        ),
        Err(error) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus::not_ready(
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                &error.to_string(),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alive_report_omits_dataset_fields() {
        let report = HealthStatus::alive("evemaps-service", "0.1.0");
        assert_eq!(report.status, "ok");
        assert!(report.systems_loaded.is_none());

        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("systems_loaded"));
    }

    #[test]
    fn ready_report_counts_datasets() {
        let report = HealthStatus::ready("evemaps-service", "0.1.0", 8000, 12);
        assert_eq!(report.systems_loaded, Some(8000));
        assert_eq!(report.status_entries, Some(12));
    }

    #[test]
    fn not_ready_report_names_the_reason() {
        let report = HealthStatus::not_ready("evemaps-service", "0.1.0", "dataset missing");
        assert!(report.status.starts_with("not_ready"));
        assert!(report.status.contains("dataset missing"));
    }
}
