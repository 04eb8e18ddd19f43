//! Service configuration resolved from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use evemaps_lib::{
    DEFAULT_MAX_WAYPOINTS, DEFAULT_RESULT_TTL, EVE_SCOUT_BASE_URL, ExecutorConfig, LimiterConfig,
};

/// Runtime configuration for the route service.
///
/// Every field has a default suitable for a container deployment; the
/// `EVEMAPS_*` environment variables override them individually.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Location of the universe dataset (`EVEMAPS_UNIVERSE_PATH`).
    pub universe_path: PathBuf,
    /// Optional location of the system status dataset (`EVEMAPS_STATUS_PATH`).
    pub status_path: Option<PathBuf>,
    /// Listen address (`EVEMAPS_BIND_ADDR`).
    pub bind_addr: SocketAddr,
    /// Base URL of the wormhole connection feed (`EVEMAPS_SCOUT_URL`).
    pub scout_url: String,
    /// Maximum number of waypoints accepted per request
    /// (`EVEMAPS_MAX_WAYPOINTS`).
    pub max_waypoints: usize,
    /// Worker pool sizing and per-route deadline.
    pub executor: ExecutorConfig,
    /// How long computed routes stay cached.
    pub result_ttl: Duration,
    /// Per-client admission quotas.
    pub limits: LimiterConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            universe_path: default_universe_path(),
            status_path: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            scout_url: EVE_SCOUT_BASE_URL.to_string(),
            max_waypoints: DEFAULT_MAX_WAYPOINTS,
            executor: ExecutorConfig::default(),
            result_ttl: DEFAULT_RESULT_TTL,
            limits: LimiterConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Build the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let universe_path = env::var("EVEMAPS_UNIVERSE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.universe_path);
        let status_path = env::var("EVEMAPS_STATUS_PATH").ok().map(PathBuf::from);
        let bind_addr = env::var("EVEMAPS_BIND_ADDR")
            .ok()
            .and_then(|addr| addr.parse().ok())
            .unwrap_or(defaults.bind_addr);
        let scout_url = env::var("EVEMAPS_SCOUT_URL").unwrap_or(defaults.scout_url);
        let max_waypoints = env::var("EVEMAPS_MAX_WAYPOINTS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.max_waypoints);

        let mut executor = defaults.executor;
        if let Some(seconds) = env::var("EVEMAPS_ROUTE_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            executor.deadline = Duration::from_secs(seconds);
        }
        if let Some(workers) = env::var("EVEMAPS_MAX_WORKERS")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            executor.max_workers = workers;
        }

        Self {
            universe_path,
            status_path,
            bind_addr,
            scout_url,
            max_waypoints,
            executor,
            result_ttl: defaults.result_ttl,
            limits: defaults.limits,
        }
    }
}

/// Platform data directory for the universe dataset, with a fixed fallback
/// for containers without a home directory.
fn default_universe_path() -> PathBuf {
    ProjectDirs::from("", "", "evemaps")
        .map(|dirs| dirs.data_dir().join("universe.json"))
        .unwrap_or_else(|| PathBuf::from("/data/universe.json"))
}
