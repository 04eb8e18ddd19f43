//! HTTP endpoints for route planning, system search and range queries.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{Extensions, HeaderMap, StatusCode, request::Parts},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use evemaps_lib::{
    Error as LibError, OverlayFlags, RateClass, RouteRequest as PlanRequest, RouteStep, ShipSize,
    gather_overlay_edges, plan_route,
};

use crate::health::{health_live, health_ready};
use crate::metrics::{
    metrics_handler, record_route_cache_hit, record_route_calculated, record_route_failed,
    record_route_jumps, record_search_performed, record_systems_query,
};
use crate::problem::{ProblemDetails, from_lib_error};
use crate::state::AppState;

/// Request payload validation.
///
/// Validation failures become 400 problem documents carrying the request id.
pub trait Validate {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Route computation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// Name of the starting system.
    pub origin: String,
    /// Name of the destination system.
    pub destination: String,
    /// Systems the route must pass through, in request order.
    #[serde(default)]
    pub waypoints: Vec<String>,
    /// Visit waypoints exactly as given instead of reordering them.
    #[serde(default)]
    pub keep_waypoints_order: bool,
    /// Smallest ship the route must accommodate.
    #[serde(default)]
    pub ship_size_floor: ShipSize,
    /// Include Thera wormhole connections.
    #[serde(default)]
    pub use_thera: bool,
    /// Include Turnur wormhole connections.
    #[serde(default)]
    pub use_turnur: bool,
    /// Systems the route must never enter.
    #[serde(default)]
    pub avoid_systems: Vec<String>,
    /// Avoid systems flagged with an active incursion.
    #[serde(default)]
    pub avoid_incursions: bool,
    /// Avoid systems flagged as Triglavian-held.
    #[serde(default)]
    pub avoid_triglavian: bool,
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.origin.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "Field 'origin' cannot be empty",
                request_id,
            )));
        }
        if self.destination.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "Field 'destination' cannot be empty",
                request_id,
            )));
        }
        if self.waypoints.iter().any(|name| name.trim().is_empty()) {
            return Err(Box::new(ProblemDetails::bad_request(
                "Waypoint names cannot be empty",
                request_id,
            )));
        }
        if self.avoid_systems.iter().any(|name| name.trim().is_empty()) {
            return Err(Box::new(ProblemDetails::bad_request(
                "Avoided system names cannot be empty",
                request_id,
            )));
        }
        Ok(())
    }
}

/// Computed route returned to the client and kept in the result cache.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    /// Number of gate or wormhole transitions along the route.
    pub jumps: usize,
    /// Systems along the route in travel order, endpoints included.
    pub route: Vec<RouteStep>,
    /// Milliseconds spent computing the route.
    pub execution_time: u128,
}

/// Fuzzy system name search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

impl Validate for SearchRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.query.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "Field 'query' cannot be empty",
                request_id,
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<String>,
}

/// How `/systems` measures proximity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemsMode {
    /// Systems reachable within a number of stargate jumps.
    #[default]
    Stargate,
    /// Systems within a lightyear radius, highsec excluded.
    Lightyears,
    /// Systems within a jump drive's range, highsec excluded.
    #[serde(rename = "jump drive")]
    JumpDrive,
}

impl SystemsMode {
    fn label(self) -> &'static str {
        match self {
            Self::Stargate => "stargate",
            Self::Lightyears => "lightyears",
            Self::JumpDrive => "jump_drive",
        }
    }
}

/// Nearby-systems request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemsRequest {
    /// Name of the system to measure from.
    pub system: String,
    #[serde(default)]
    pub mode: SystemsMode,
    /// Jump budget for stargate mode.
    #[serde(default)]
    pub stargate_jumps: Option<usize>,
    /// Radius in lightyears for lightyears mode.
    #[serde(default)]
    pub lightyears: Option<f64>,
    /// Jump drive range in lightyears for jump drive mode.
    #[serde(default)]
    pub jump_drive_range: Option<f64>,
}

impl Validate for SystemsRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.system.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "Field 'system' cannot be empty",
                request_id,
            )));
        }
        match self.mode {
            SystemsMode::Stargate => {
                if !self.stargate_jumps.is_some_and(|jumps| jumps > 0) {
                    return Err(Box::new(ProblemDetails::bad_request(
                        "Field 'stargateJumps' must be a positive jump budget for stargate mode",
                        request_id,
                    )));
                }
            }
            SystemsMode::Lightyears => {
                if !self.lightyears.is_some_and(|range| range > 0.0) {
                    return Err(Box::new(ProblemDetails::bad_request(
                        "Field 'lightyears' must be a positive range for lightyears mode",
                        request_id,
                    )));
                }
            }
            SystemsMode::JumpDrive => {
                if !self.jump_drive_range.is_some_and(|range| range > 0.0) {
                    return Err(Box::new(ProblemDetails::bad_request(
                        "Field 'jumpDriveRange' must be a positive range for jump drive mode",
                        request_id,
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemsResponse {
    pub systems: Vec<String>,
}

/// Handler outcome: either the payload or an RFC 9457 problem.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(T),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiResponse::Success(payload) => (StatusCode::OK, Json(payload)).into_response(),
            ApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

/// Assemble the service router with all endpoints and shared layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/route", post(route_handler))
        .route("/search", post(search_handler))
        .route("/systems", post(systems_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Compute a route between two systems, honoring waypoints, avoidance and
/// wormhole overlays.
pub async fn route_handler(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    Json(request): Json<RouteRequest>,
) -> ApiResponse<RouteResponse> {
    let request_id = generate_request_id();

    info!(
        request_id = %request_id,
        origin = %request.origin,
        destination = %request.destination,
        waypoints = request.waypoints.len(),
        "handling route request"
    );

    if let Err(problem) = request.validate(&request_id) {
        record_route_failed("validation_error");
        return ApiResponse::Error(*problem);
    }

    let max_waypoints = state.config().max_waypoints;
    if request.waypoints.len() > max_waypoints {
        record_route_failed("validation_error");
        return ApiResponse::Error(ProblemDetails::bad_request(
            format!("At most {max_waypoints} waypoints are supported per request"),
            &request_id,
        ));
    }

    if let Err(limited) = state.limiter().check(&client, RateClass::General) {
        record_route_failed("rate_limited");
        return ApiResponse::Error(from_lib_error(&limited, &request_id));
    }

    let avoid_ids = state
        .status()
        .avoid_ids(request.avoid_incursions, request.avoid_triglavian);

    let plan_request = PlanRequest {
        origin: request.origin.clone(),
        destination: request.destination.clone(),
        waypoints: request.waypoints.clone(),
        keep_waypoint_order: request.keep_waypoints_order,
        ship_size_floor: request.ship_size_floor,
        avoid_systems: request.avoid_systems.clone(),
        avoid_ids,
        overlay: OverlayFlags {
            use_thera: request.use_thera,
            use_turnur: request.use_turnur,
        },
    };
    let fingerprint = plan_request.fingerprint();

    if let Some(cached) = state.cache().get(fingerprint) {
        record_route_cache_hit();
        info!(request_id = %request_id, fingerprint, "route served from cache");
        return ApiResponse::Success(cached);
    }

    // Cache misses consume the per-class allowance on top of the general one.
    let class = if request.waypoints.is_empty() {
        RateClass::Direct
    } else {
        RateClass::Waypoint
    };
    if let Err(limited) = state.limiter().check(&client, class) {
        record_route_failed("rate_limited");
        return ApiResponse::Error(from_lib_error(&limited, &request_id));
    }

    let started = Instant::now();

    let overlay_edges = match gather_overlay_edges(state.providers(), plan_request.overlay).await {
        Ok(edges) => edges,
        Err(failure) => {
            error!(request_id = %request_id, error = %failure, "failed to collect wormhole connections");
            record_route_failed("overlay_unavailable");
            return ApiResponse::Error(from_lib_error(&failure, &request_id));
        }
    };

    let universe = match state.universe().get() {
        Ok(universe) => universe,
        Err(failure) => {
            error!(request_id = %request_id, error = %failure, "universe dataset unavailable");
            record_route_failed("dataset_unavailable");
            return ApiResponse::Error(from_lib_error(&failure, &request_id));
        }
    };

    let worker_request = plan_request.clone();
    let outcome = state
        .executor()
        .execute(move |cancel| plan_route(&universe, &worker_request, &overlay_edges, cancel))
        .await;

    let plan = match outcome {
        Ok(plan) => plan,
        Err(failure) => {
            error!(request_id = %request_id, error = %failure, "route computation failed");
            let reason = match &failure {
                LibError::UnknownSystem { .. } => "unknown_system",
                LibError::Timeout { .. } => "timeout",
                _ => "internal_error",
            };
            record_route_failed(reason);
            return ApiResponse::Error(from_lib_error(&failure, &request_id));
        }
    };

    let response = RouteResponse {
        jumps: plan.jumps,
        route: plan.steps,
        execution_time: started.elapsed().as_millis(),
    };
    state.cache().put(fingerprint, response.clone());

    record_route_calculated();
    record_route_jumps(response.jumps);
    info!(
        request_id = %request_id,
        jumps = response.jumps,
        systems = response.route.len(),
        execution_time_ms = response.execution_time as u64,
        "route computed"
    );

    ApiResponse::Success(response)
}

/// Fuzzy-search system names.
pub async fn search_handler(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    Json(request): Json<SearchRequest>,
) -> ApiResponse<SearchResponse> {
    let request_id = generate_request_id();

    if let Err(problem) = request.validate(&request_id) {
        return ApiResponse::Error(*problem);
    }
    if let Err(limited) = state.limiter().check(&client, RateClass::General) {
        return ApiResponse::Error(from_lib_error(&limited, &request_id));
    }

    let universe = match state.universe().get() {
        Ok(universe) => universe,
        Err(failure) => {
            error!(request_id = %request_id, error = %failure, "universe dataset unavailable");
            return ApiResponse::Error(from_lib_error(&failure, &request_id));
        }
    };

    let results = universe.fuzzy_search(&request.query);
    record_search_performed(results.len());
    info!(request_id = %request_id, query = %request.query, matches = results.len(), "search completed");

    ApiResponse::Success(SearchResponse { results })
}

/// List systems near a reference system by jumps or by distance.
pub async fn systems_handler(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    Json(request): Json<SystemsRequest>,
) -> ApiResponse<SystemsResponse> {
    let request_id = generate_request_id();

    if let Err(problem) = request.validate(&request_id) {
        return ApiResponse::Error(*problem);
    }
    if let Err(limited) = state.limiter().check(&client, RateClass::General) {
        return ApiResponse::Error(from_lib_error(&limited, &request_id));
    }

    let universe = match state.universe().get() {
        Ok(universe) => universe,
        Err(failure) => {
            error!(request_id = %request_id, error = %failure, "universe dataset unavailable");
            return ApiResponse::Error(from_lib_error(&failure, &request_id));
        }
    };

    let start = match universe.resolve(&request.system) {
        Ok(id) => id,
        Err(failure) => return ApiResponse::Error(from_lib_error(&failure, &request_id)),
    };

    let ids = match request.mode {
        SystemsMode::Stargate => {
            universe.systems_within_jumps(start, request.stargate_jumps.unwrap_or_default())
        }
        SystemsMode::Lightyears => {
            universe.systems_within_range_ly(start, request.lightyears.unwrap_or_default())
        }
        SystemsMode::JumpDrive => {
            universe.systems_within_range_ly(start, request.jump_drive_range.unwrap_or_default())
        }
    };
    let systems: Vec<String> = ids
        .iter()
        .map(|id| universe.resolve_name(*id).to_string())
        .collect();

    record_systems_query(request.mode.label());
    info!(
        request_id = %request_id,
        system = %request.system,
        mode = request.mode.label(),
        matches = systems.len(),
        "systems query completed"
    );

    ApiResponse::Success(SystemsResponse { systems })
}

/// Requesting client identity used to key rate-limit windows.
///
/// Extraction never fails: requests that arrive without forwarding headers
/// or connect info share the `"unknown"` bucket.
pub struct ClientAddr(pub String);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_key(&parts.headers, &parts.extensions)))
    }
}

/// Identify the requesting client for rate limiting. Proxy forwarding
/// headers outrank the socket peer so deployments behind a load balancer
/// key on the original client, not the balancer.
fn client_key(headers: &HeaderMap, extensions: &Extensions) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(|ip| ip.trim().to_string())
        })
        .or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(peer)| peer.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn generate_request_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("req-{nanos:x}")
}
