use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::universe::{Jump, ShipSize, SystemId, Universe};

/// Light-years one jump is assumed to cover when estimating remaining
/// distance.
///
/// The estimate stays admissible as long as no gate in the dataset spans more
/// light-years than this, which holds for the shipped universe by a wide
/// margin.
const HEURISTIC_JUMP_REACH_LY: f64 = 20.0;

/// How many node expansions happen between cancellation checks.
const CANCEL_CHECK_STRIDE: usize = 1024;

/// Cooperative cancellation flag shared between a search and its supervisor.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the holder of this token stop working.
    pub fn cancel(&self) {
        self.flag.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(AtomicOrdering::Relaxed)
    }
}

/// Restrictions applied to a single path search.
#[derive(Debug, Clone, Default)]
pub struct SearchConstraints {
    /// Minimum capacity class every traversed connection must support.
    pub ship_size_floor: ShipSize,
    /// Systems the path must not pass through.
    pub avoided_systems: HashSet<SystemId>,
    overlay: HashMap<SystemId, Vec<Jump>>,
}

impl SearchConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ship_size_floor(mut self, floor: ShipSize) -> Self {
        self.ship_size_floor = floor;
        self
    }

    pub fn with_avoided_systems(mut self, avoided: HashSet<SystemId>) -> Self {
        self.avoided_systems = avoided;
        self
    }

    /// Add request-scoped connections on top of the static graph.
    ///
    /// Overlay edges are directed; callers wanting two-way traversal must
    /// supply both directions.
    pub fn with_overlay_edges(mut self, edges: &[Jump]) -> Self {
        for edge in edges {
            self.overlay.entry(edge.from).or_default().push(*edge);
        }
        self
    }

    pub fn has_overlay(&self) -> bool {
        !self.overlay.is_empty()
    }

    fn overlay_edges_from(&self, id: SystemId) -> &[Jump] {
        self.overlay.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn allows(&self, edge: &Jump) -> bool {
        edge.passes_floor(self.ship_size_floor) && !self.avoided_systems.contains(&edge.to)
    }
}

/// Total-order wrapper so f64 estimates can live in a `BinaryHeap`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FloatOrd(f64);

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AStarEntry {
    total: FloatOrd,
    node: SystemId,
}

impl Ord for AStarEntry {
    // Reversed so the max-heap pops the smallest estimate; equal estimates
    // pop the lowest system id, which keeps results deterministic.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total
            .cmp(&self.total)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest jump path from `start` to `goal` under the given
/// constraints.
///
/// Every connection costs one jump regardless of spatial distance. Returns
/// the full system sequence including both endpoints, `Some(vec![start])`
/// when the endpoints coincide, and `None` when no route exists or the
/// search was cancelled.
pub fn find_path(
    universe: &Universe,
    start: SystemId,
    goal: SystemId,
    constraints: &SearchConstraints,
    cancel: &CancelToken,
) -> Option<Vec<SystemId>> {
    if constraints.avoided_systems.contains(&start)
        || constraints.avoided_systems.contains(&goal)
    {
        return None;
    }
    universe.system(start)?;
    let goal_position = universe.system(goal)?.position;

    if start == goal {
        return Some(vec![start]);
    }

    // Overlay connections can cross arbitrary distances, so the spatial
    // estimate is only sound on the static graph.
    let estimate_enabled = !constraints.has_overlay();
    let estimate = |id: SystemId| -> f64 {
        if !estimate_enabled {
            return 0.0;
        }
        universe
            .system(id)
            .map(|system| system.position.distance_ly_to(&goal_position) / HEURISTIC_JUMP_REACH_LY)
            .unwrap_or(0.0)
    };

    let mut open = BinaryHeap::new();
    let mut parents: HashMap<SystemId, SystemId> = HashMap::new();
    let mut jumps_to: HashMap<SystemId, u32> = HashMap::new();
    let mut visited: HashSet<SystemId> = HashSet::new();
    let mut expansions = 0usize;

    jumps_to.insert(start, 0);
    open.push(AStarEntry {
        total: FloatOrd(estimate(start)),
        node: start,
    });

    while let Some(AStarEntry { node, .. }) = open.pop() {
        if !visited.insert(node) {
            continue;
        }
        if node == goal {
            return Some(reconstruct_path(&parents, start, goal));
        }

        expansions += 1;
        if expansions % CANCEL_CHECK_STRIDE == 0 && cancel.is_cancelled() {
            return None;
        }

        let current_jumps = jumps_to.get(&node).copied().unwrap_or(u32::MAX);
        let overlay = constraints.overlay_edges_from(node);
        for edge in universe.edges_from(node).iter().chain(overlay) {
            if !constraints.allows(edge) || visited.contains(&edge.to) {
                continue;
            }
            let tentative = current_jumps + 1;
            if tentative < jumps_to.get(&edge.to).copied().unwrap_or(u32::MAX) {
                jumps_to.insert(edge.to, tentative);
                parents.insert(edge.to, node);
                open.push(AStarEntry {
                    total: FloatOrd(f64::from(tentative) + estimate(edge.to)),
                    node: edge.to,
                });
            }
        }
    }

    None
}

fn reconstruct_path(
    parents: &HashMap<SystemId, SystemId>,
    start: SystemId,
    goal: SystemId,
) -> Vec<SystemId> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
