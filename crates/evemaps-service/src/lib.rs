//! HTTP layer of the EVE Maps route service.
//!
//! All routing logic lives in `evemaps-lib`; this crate provides the HTTP
//! glue around it:
//!
//! - [`routes`]: axum handlers for `/route`, `/search` and `/systems`
//! - [`state`]: shared [`AppState`] holding the datasets, worker pool,
//!   result cache and rate limiter
//! - [`problem`]: RFC 9457 Problem Details for consistent error responses
//! - [`health`]: liveness/readiness probes
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: structured JSON logging setup
//! - [`config`]: environment-driven configuration
//!
//! The binary in `main.rs` wires these together; integration tests build the
//! same router via [`build_router`] against fixture datasets.

#![deny(warnings)]

pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod problem;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use health::{HealthStatus, health_live, health_ready};
pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use metrics::{MetricsConfig, MetricsError, init_metrics, metrics_handler};
pub use problem::{
    PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST, PROBLEM_RATE_LIMITED,
    PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_TIMEOUT, PROBLEM_UNKNOWN_SYSTEM, ProblemDetails,
    from_lib_error,
};
pub use routes::{
    ApiResponse, RouteRequest, RouteResponse, SearchRequest, SearchResponse, SystemsMode,
    SystemsRequest, SystemsResponse, Validate, build_router,
};
pub use state::AppState;
