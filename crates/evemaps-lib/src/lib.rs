//! Core engine for the EVE Maps route service.
//!
//! Holds the universe graph and the jump pathfinding that runs over it,
//! together with the execution, caching and admission primitives the HTTP
//! service composes into its routing endpoints.

#![deny(warnings)]

pub mod cache;
pub mod error;
pub mod executor;
pub mod limiter;
pub mod overlay;
pub mod path;
pub mod routing;
pub mod status;
pub mod test_helpers;
pub mod universe;

pub use cache::{ResultCache, DEFAULT_RESULT_TTL};
pub use error::{Error, Result};
pub use executor::{ExecutorConfig, RouteExecutor, DEFAULT_MAX_WORKERS, DEFAULT_ROUTE_DEADLINE};
pub use limiter::{LimiterConfig, RateClass, RateLimiter, RateQuota};
pub use overlay::{
    gather_overlay_edges, EveScoutProvider, OverlayFlags, OverlayProvider, EVE_SCOUT_BASE_URL,
};
pub use path::{find_path, CancelToken, SearchConstraints};
pub use routing::{plan_route, RoutePlan, RouteRequest, RouteStep, DEFAULT_MAX_WAYPOINTS};
pub use status::{StatusStore, SystemStatus};
pub use universe::{
    load_universe, Jump, Position, ShipSize, SolarSystem, SystemId, Universe, UniverseStore,
    LY_PER_UNIT, SEARCH_RESULT_LIMIT,
};
