use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::overlay::OverlayFlags;
use crate::path::{find_path, CancelToken, SearchConstraints};
use crate::universe::{Jump, ShipSize, SystemId, Universe};

/// Default ceiling on the number of waypoints a single request may carry.
///
/// Unordered waypoints are optimized by exhaustive permutation, so the
/// ceiling keeps the factorial work bounded.
pub const DEFAULT_MAX_WAYPOINTS: usize = 3;

/// A fully-described routing request after HTTP-level validation.
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,
    pub waypoints: Vec<String>,
    /// Visit waypoints exactly in the given order instead of optimizing.
    pub keep_waypoint_order: bool,
    pub ship_size_floor: ShipSize,
    /// Systems to avoid, by name.
    pub avoid_systems: Vec<String>,
    /// Systems to avoid, by identifier (hazard classes resolve to these).
    pub avoid_ids: HashSet<SystemId>,
    pub overlay: OverlayFlags,
}

impl RouteRequest {
    /// Stable digest of everything that influences the computed route.
    ///
    /// Names are compared case-insensitively and avoid lists are order-free,
    /// so requests differing only in spelling case or avoid ordering share a
    /// fingerprint.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.origin.to_lowercase().hash(&mut hasher);
        self.destination.to_lowercase().hash(&mut hasher);

        let waypoints: Vec<String> = self
            .waypoints
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        waypoints.hash(&mut hasher);

        self.keep_waypoint_order.hash(&mut hasher);
        self.ship_size_floor.hash(&mut hasher);
        self.overlay.use_thera.hash(&mut hasher);
        self.overlay.use_turnur.hash(&mut hasher);

        let mut avoided: Vec<String> = self
            .avoid_systems
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        avoided.sort_unstable();
        avoided.hash(&mut hasher);

        let mut avoided_ids: Vec<SystemId> = self.avoid_ids.iter().copied().collect();
        avoided_ids.sort_unstable();
        avoided_ids.hash(&mut hasher);

        hasher.finish()
    }
}

/// One node of a computed route, annotated with the jumps taken so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStep {
    pub id: SystemId,
    pub name: String,
    pub jumps: usize,
}

/// A computed route, or the empty plan when no route exists.
#[derive(Debug, Clone, Default)]
pub struct RoutePlan {
    pub steps: Vec<RouteStep>,
    pub jumps: usize,
}

impl RoutePlan {
    /// The plan returned when the destination cannot be reached.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_unreachable(&self) -> bool {
        self.steps.is_empty()
    }

    fn from_ids(universe: &Universe, ids: Vec<SystemId>) -> Self {
        let jumps = ids.len().saturating_sub(1);
        let steps = ids
            .into_iter()
            .enumerate()
            .map(|(taken, id)| RouteStep {
                id,
                name: universe.resolve_name(id).to_string(),
                jumps: taken,
            })
            .collect();
        Self { steps, jumps }
    }
}

struct PlanContext<'a> {
    universe: &'a Universe,
    constraints: &'a SearchConstraints,
    cancel: &'a CancelToken,
}

/// Memo of shortest legs already computed for this request.
///
/// Permutations of the same waypoints revisit the same ordered pairs, so each
/// pair is searched at most once. Unreachable legs are memoized too.
struct LegCache {
    legs: HashMap<(SystemId, SystemId), Option<Vec<SystemId>>>,
}

impl LegCache {
    fn new() -> Self {
        Self {
            legs: HashMap::new(),
        }
    }

    fn shortest(&mut self, ctx: &PlanContext<'_>, from: SystemId, to: SystemId) -> Option<Vec<SystemId>> {
        if let Some(cached) = self.legs.get(&(from, to)) {
            return cached.clone();
        }
        let leg = find_path(ctx.universe, from, to, ctx.constraints, ctx.cancel);
        self.legs.insert((from, to), leg.clone());
        leg
    }
}

/// Compute the best route satisfying `request`.
///
/// All named systems must resolve; an unknown name fails the whole request.
/// An unreachable destination (or an avoided endpoint) is not an error and
/// yields [`RoutePlan::empty`].
pub fn plan_route(
    universe: &Universe,
    request: &RouteRequest,
    overlay_edges: &[Jump],
    cancel: &CancelToken,
) -> Result<RoutePlan> {
    let origin = universe.resolve(&request.origin)?;
    let destination = universe.resolve(&request.destination)?;

    let mut stops = Vec::with_capacity(request.waypoints.len());
    for waypoint in &request.waypoints {
        stops.push(universe.resolve(waypoint)?);
    }

    let mut avoided = request.avoid_ids.clone();
    for name in &request.avoid_systems {
        avoided.insert(universe.resolve(name)?);
    }

    debug!(
        origin,
        destination,
        waypoints = stops.len(),
        avoided = avoided.len(),
        overlay_edges = overlay_edges.len(),
        keep_order = request.keep_waypoint_order,
        "planning route"
    );

    if avoided.contains(&origin) || avoided.contains(&destination) {
        return Ok(RoutePlan::empty());
    }

    let constraints = SearchConstraints::new()
        .with_ship_size_floor(request.ship_size_floor)
        .with_avoided_systems(avoided)
        .with_overlay_edges(overlay_edges);

    let ctx = PlanContext {
        universe,
        constraints: &constraints,
        cancel,
    };
    let mut legs = LegCache::new();

    let ids = if stops.is_empty() {
        legs.shortest(&ctx, origin, destination)
    } else if request.keep_waypoint_order {
        stitch_order(&ctx, &mut legs, origin, &stops, destination)
    } else {
        best_permutation(&ctx, &mut legs, origin, &stops, destination)
    };

    Ok(match ids {
        Some(ids) => RoutePlan::from_ids(universe, ids),
        None => RoutePlan::empty(),
    })
}

/// Stitch legs along a fixed visit order, dropping duplicated junctions.
fn stitch_order(
    ctx: &PlanContext<'_>,
    legs: &mut LegCache,
    origin: SystemId,
    stops: &[SystemId],
    destination: SystemId,
) -> Option<Vec<SystemId>> {
    let mut order = Vec::with_capacity(stops.len() + 2);
    order.push(origin);
    order.extend_from_slice(stops);
    order.push(destination);
    stitch(ctx, legs, &order)
}

fn stitch(
    ctx: &PlanContext<'_>,
    legs: &mut LegCache,
    order: &[SystemId],
) -> Option<Vec<SystemId>> {
    let mut combined: Vec<SystemId> = Vec::new();
    for pair in order.windows(2) {
        let leg = legs.shortest(ctx, pair[0], pair[1])?;
        if combined.is_empty() {
            combined.extend_from_slice(&leg);
        } else {
            combined.extend_from_slice(&leg[1..]);
        }
    }
    Some(combined)
}

/// Try every waypoint ordering and keep the shortest stitched route.
///
/// Orderings are generated in lexicographic index order and a later ordering
/// only replaces the incumbent when strictly shorter, so ties resolve to the
/// first ordering found. Orderings with an unreachable leg are disqualified.
fn best_permutation(
    ctx: &PlanContext<'_>,
    legs: &mut LegCache,
    origin: SystemId,
    stops: &[SystemId],
    destination: SystemId,
) -> Option<Vec<SystemId>> {
    let mut used = vec![false; stops.len()];
    let mut current = Vec::with_capacity(stops.len());
    let mut best: Option<Vec<SystemId>> = None;
    permute(ctx, legs, origin, stops, destination, &mut used, &mut current, &mut best);
    best
}

#[allow(clippy::too_many_arguments)]
fn permute(
    ctx: &PlanContext<'_>,
    legs: &mut LegCache,
    origin: SystemId,
    stops: &[SystemId],
    destination: SystemId,
    used: &mut [bool],
    current: &mut Vec<SystemId>,
    best: &mut Option<Vec<SystemId>>,
) {
    if ctx.cancel.is_cancelled() {
        return;
    }

    if current.len() == stops.len() {
        let mut order = Vec::with_capacity(stops.len() + 2);
        order.push(origin);
        order.extend_from_slice(current);
        order.push(destination);

        if let Some(candidate) = stitch(ctx, legs, &order) {
            let better = best
                .as_ref()
                .map_or(true, |incumbent| candidate.len() < incumbent.len());
            if better {
                *best = Some(candidate);
            }
        }
        return;
    }

    for index in 0..stops.len() {
        if used[index] {
            continue;
        }
        used[index] = true;
        current.push(stops[index]);
        permute(ctx, legs, origin, stops, destination, used, current, best);
        current.pop();
        used[index] = false;
    }
}
