use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Numeric identifier for a solar system.
pub type SystemId = i64;

/// Conversion factor from normalized dataset units to light-years.
pub const LY_PER_UNIT: f64 = 3.26 / 0.0635;

/// Maximum number of names returned by [`Universe::fuzzy_search`].
pub const SEARCH_RESULT_LIMIT: usize = 10;

/// Cartesian coordinates for a solar system, in normalized dataset units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Calculate the Euclidean distance to another position in dataset units.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Calculate the distance to another position in light-years.
    pub fn distance_ly_to(&self, other: &Self) -> f64 {
        self.distance_to(other) * LY_PER_UNIT
    }
}

/// Ship capacity classes in ascending order of mass allowance.
///
/// `Unknown` ranks above every named class so that unclassified connections
/// stay usable regardless of the requested floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ShipSize {
    #[default]
    Small,
    Medium,
    Large,
    Xlarge,
    Capital,
    Unknown,
}

impl ShipSize {
    /// Parse a capacity class from its wire representation.
    ///
    /// Unrecognized values map to `Unknown` rather than failing, matching the
    /// permissive handling of upstream wormhole feeds.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "small" => ShipSize::Small,
            "medium" => ShipSize::Medium,
            "large" => ShipSize::Large,
            "xlarge" => ShipSize::Xlarge,
            "capital" => ShipSize::Capital,
            _ => ShipSize::Unknown,
        }
    }
}

/// Representation of a solar system.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarSystem {
    pub id: SystemId,
    pub name: String,
    pub security: f64,
    pub region: String,
    pub position: Position,
}

/// Directed connection between two systems.
///
/// Stargate connections from the dataset carry no capacity constraint; overlay
/// connections (wormholes) usually do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub from: SystemId,
    pub to: SystemId,
    pub max_ship_size: Option<ShipSize>,
}

impl Jump {
    /// Construct an unconstrained stargate connection.
    pub fn gate(from: SystemId, to: SystemId) -> Self {
        Self {
            from,
            to,
            max_ship_size: None,
        }
    }

    /// Whether the connection is traversable under the given capacity floor.
    pub fn passes_floor(&self, floor: ShipSize) -> bool {
        self.max_ship_size.map_or(true, |size| size >= floor)
    }
}

/// In-memory representation of the universe graph.
///
/// Systems are kept in dataset order so that search ranking ties resolve the
/// same way on every load.
#[derive(Debug)]
pub struct Universe {
    systems: Vec<SolarSystem>,
    by_id: HashMap<SystemId, usize>,
    name_to_id: HashMap<String, SystemId>,
    adjacency: Arc<HashMap<SystemId, Vec<Jump>>>,
}

impl Universe {
    /// Build a universe from already-parsed systems and jumps.
    ///
    /// Jump endpoints that do not reference a known system are dropped so that
    /// corrupt edges never reach the in-memory graph.
    pub fn from_parts(systems: Vec<SolarSystem>, jumps: Vec<Jump>) -> Self {
        let mut by_id = HashMap::new();
        let mut name_to_id = HashMap::new();
        for (index, system) in systems.iter().enumerate() {
            by_id.insert(system.id, index);
            name_to_id.insert(system.name.to_lowercase(), system.id);
        }

        let mut adjacency: HashMap<SystemId, Vec<Jump>> = HashMap::new();
        let mut skipped_edges = 0usize;
        for jump in jumps {
            if !by_id.contains_key(&jump.from) || !by_id.contains_key(&jump.to) {
                skipped_edges += 1;
                continue;
            }
            adjacency.entry(jump.from).or_default().push(jump);
        }

        for edges in adjacency.values_mut() {
            edges.sort_unstable_by_key(|edge| edge.to);
            edges.dedup_by_key(|edge| edge.to);
        }

        if skipped_edges > 0 {
            warn!(skipped_edges, "ignored jump edges referencing unknown systems");
        }

        Self {
            systems,
            by_id,
            name_to_id,
            adjacency: Arc::new(adjacency),
        }
    }

    /// Number of systems in the universe.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether the universe holds no systems.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// All systems in dataset order.
    pub fn systems(&self) -> &[SolarSystem] {
        &self.systems
    }

    /// Lookup a system by identifier.
    pub fn system(&self, id: SystemId) -> Option<&SolarSystem> {
        self.by_id.get(&id).map(|&index| &self.systems[index])
    }

    /// Resolve a system name to its identifier, case-insensitively.
    ///
    /// Unknown names fail with suggestions drawn from the closest matches.
    pub fn resolve(&self, name: &str) -> Result<SystemId> {
        self.name_to_id
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| Error::UnknownSystem {
                name: name.to_string(),
                suggestions: self.fuzzy_matches(name, 3),
            })
    }

    /// Lookup a system name by identifier, or `"unknown"` when absent.
    pub fn resolve_name(&self, id: SystemId) -> &str {
        self.system(id).map(|system| system.name.as_str()).unwrap_or("unknown")
    }

    /// Outgoing connections from a system (read-only view).
    pub fn edges_from(&self, id: SystemId) -> &[Jump] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shared handle to the full adjacency table.
    pub fn adjacency(&self) -> Arc<HashMap<SystemId, Vec<Jump>>> {
        Arc::clone(&self.adjacency)
    }

    /// Closest system names to a (likely misspelled) input, best first.
    pub fn fuzzy_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &str)> = self
            .systems
            .iter()
            .filter_map(|system| {
                let score = strsim::jaro_winkler(&needle, &system.name.to_lowercase());
                (score >= 0.7).then_some((score, system.name.as_str()))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Search system names by approximate match, best first.
    ///
    /// Substring hits outrank similarity hits; ties keep dataset order. At
    /// most [`SEARCH_RESULT_LIMIT`] names are returned.
    pub fn fuzzy_search(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &str)> = self
            .systems
            .iter()
            .filter_map(|system| {
                let score = search_score(&needle, &system.name.to_lowercase());
                (score > 0.6).then_some((score, system.name.as_str()))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Systems reachable within `max_jumps` stargate jumps of `start`,
    /// including `start` itself, in traversal order.
    pub fn systems_within_jumps(&self, start: SystemId, max_jumps: usize) -> Vec<SystemId> {
        if !self.by_id.contains_key(&start) {
            return Vec::new();
        }

        let mut visited = HashSet::from([start]);
        let mut order = vec![start];
        let mut frontier = VecDeque::from([(start, 0usize)]);

        while let Some((current, depth)) = frontier.pop_front() {
            if depth == max_jumps {
                continue;
            }
            for edge in self.edges_from(current) {
                if visited.insert(edge.to) {
                    order.push(edge.to);
                    frontier.push_back((edge.to, depth + 1));
                }
            }
        }

        order
    }

    /// Systems within `max_ly` light-years of `start`, including `start`
    /// itself, in dataset order.
    ///
    /// High-security systems (security above 0.4) cannot be jumped to and are
    /// excluded from the results.
    pub fn systems_within_range_ly(&self, start: SystemId, max_ly: f64) -> Vec<SystemId> {
        let Some(origin) = self.system(start) else {
            return Vec::new();
        };

        self.systems
            .iter()
            .filter(|system| {
                if system.id == start {
                    return true;
                }
                if system.security > 0.4 {
                    return false;
                }
                origin.position.distance_ly_to(&system.position) <= max_ly
            })
            .map(|system| system.id)
            .collect()
    }

    /// All systems in the named region, case-insensitively, in dataset order.
    pub fn systems_in_region(&self, region: &str) -> Vec<SystemId> {
        self.systems
            .iter()
            .filter(|system| system.region.eq_ignore_ascii_case(region))
            .map(|system| system.id)
            .collect()
    }
}

fn search_score(needle: &str, name: &str) -> f64 {
    if name == needle {
        1.0
    } else if name.contains(needle) {
        // Containment outranks approximate similarity; longer shared prefixes
        // of the name score marginally higher so shorter names surface first.
        0.9 + 0.1 * (needle.len() as f64 / name.len() as f64)
    } else {
        strsim::jaro_winkler(needle, name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniverseDocument {
    solar_systems: Vec<SystemRecord>,
    jumps: Vec<JumpRecord>,
}

#[derive(Debug, Deserialize)]
struct SystemRecord {
    name: String,
    id: SystemId,
    security: f64,
    region: String,
    x: f64,
    y: f64,
    z: f64,
}

impl From<SystemRecord> for SolarSystem {
    fn from(record: SystemRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            security: record.security,
            region: record.region,
            position: Position {
                x: record.x,
                y: record.y,
                z: record.z,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct JumpRecord {
    from: SystemId,
    to: SystemId,
}

/// Load the universe dataset from a JSON document.
///
/// The document must expose `solarSystems` and `jumps` collections. Any
/// failure to read or parse the document is reported as
/// [`Error::DataUnavailable`]; no partially-loaded universe is ever returned.
pub fn load_universe(path: &Path) -> Result<Universe> {
    let raw = fs::read_to_string(path).map_err(|error| Error::DataUnavailable {
        path: path.to_path_buf(),
        detail: error.to_string(),
    })?;

    let document: UniverseDocument =
        serde_json::from_str(&raw).map_err(|error| Error::DataUnavailable {
            path: path.to_path_buf(),
            detail: error.to_string(),
        })?;

    debug!(
        systems = document.solar_systems.len(),
        jumps = document.jumps.len(),
        path = %path.display(),
        "loading universe dataset"
    );

    let systems = document
        .solar_systems
        .into_iter()
        .map(SolarSystem::from)
        .collect();
    let jumps = document
        .jumps
        .into_iter()
        .map(|record| Jump::gate(record.from, record.to))
        .collect();

    Ok(Universe::from_parts(systems, jumps))
}

/// Lazily-initialized handle to the universe dataset.
///
/// The dataset is loaded on first use and memoized for the lifetime of the
/// store; concurrent first uses never load it twice. A failed load is not
/// memoized, so the store recovers once the dataset is restored.
#[derive(Debug)]
pub struct UniverseStore {
    path: PathBuf,
    cell: OnceCell<Arc<Universe>>,
}

impl UniverseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Path the store loads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the dataset has been loaded already.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The loaded universe, loading it on first call.
    pub fn get(&self) -> Result<Arc<Universe>> {
        self.cell
            .get_or_try_init(|| load_universe(&self.path).map(Arc::new))
            .cloned()
    }
}
