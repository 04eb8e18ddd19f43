//! EVE Maps route planning HTTP service.
//!
//! Computes stargate routes between solar systems with optional waypoints,
//! avoidance rules and live wormhole connections.
//!
//! # Endpoints
//!
//! - `POST /route` - Compute a route between two systems
//! - `POST /search` - Fuzzy-search system names
//! - `POST /systems` - List systems near a reference system
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `EVEMAPS_UNIVERSE_PATH` - Path to the universe dataset
//! - `EVEMAPS_STATUS_PATH` - Path to the system status dataset (optional)
//! - `EVEMAPS_BIND_ADDR` - Listen address (default `0.0.0.0:3000`)
//! - `EVEMAPS_SCOUT_URL` - Wormhole signature feed base URL
//! - `EVEMAPS_MAX_WAYPOINTS` - Waypoint cap per request (default 3)
//! - `EVEMAPS_ROUTE_TIMEOUT_SECS` - Per-route deadline (default 45)
//! - `EVEMAPS_MAX_WORKERS` - Concurrent route computations (default 8)
//! - `LOG_FORMAT` - `json` (default) or `text`

use std::net::SocketAddr;

use tracing::{error, info};

use evemaps_service::{
    AppState, LoggingConfig, MetricsConfig, ServiceConfig, build_router, init_logging,
    init_metrics,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (reads LOG_FORMAT from environment)
    let logging_config = LoggingConfig::from_env().with_service("evemaps");
    init_logging(&logging_config);

    // Metrics are optional; a failed recorder install must not stop the service
    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    let bind_addr = config.bind_addr;

    info!(
        universe_path = %config.universe_path.display(),
        max_workers = config.executor.max_workers,
        "starting route service"
    );

    let state = AppState::new(config).map_err(|e| {
        error!(error = %e, "failed to build application state");
        e
    })?;

    // Expired cached routes get swept for the lifetime of the process
    let _sweeper = state.cache().spawn_sweeper();

    let app = build_router(state);

    info!(addr = %bind_addr, "listening on");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    // Connect info feeds the per-client rate limiter when no proxy headers
    // are present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
