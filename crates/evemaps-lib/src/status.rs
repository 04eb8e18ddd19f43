use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::universe::SystemId;

/// Hazard tag attached to a solar system.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub node_id: SystemId,
    pub status: String,
}

/// Static lookup of hazardous systems, loaded once at startup.
///
/// The status document is optional; a store built without one reports no
/// hazards. Tags are matched exactly, so unrecognized tags never disqualify a
/// system by accident.
#[derive(Debug, Default)]
pub struct StatusStore {
    entries: Vec<SystemStatus>,
}

const INCURSION_TAG: &str = "incursion";
const TRIGLAVIAN_TAG: &str = "triglavian";

impl StatusStore {
    /// Load statuses from a JSON document, or build an empty store when no
    /// path is configured.
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        Self::load(path)
    }

    fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|error| Error::DataUnavailable {
            path: path.to_path_buf(),
            detail: error.to_string(),
        })?;

        let entries: Vec<SystemStatus> =
            serde_json::from_str(&raw).map_err(|error| Error::DataUnavailable {
                path: PathBuf::from(path),
                detail: error.to_string(),
            })?;

        debug!(entries = entries.len(), path = %path.display(), "loaded system statuses");
        Ok(Self { entries })
    }

    /// Number of status entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of systems matching the requested hazard classes.
    pub fn avoid_ids(&self, avoid_incursions: bool, avoid_triglavian: bool) -> HashSet<SystemId> {
        self.entries
            .iter()
            .filter(|entry| {
                (avoid_incursions && entry.status == INCURSION_TAG)
                    || (avoid_triglavian && entry.status == TRIGLAVIAN_TAG)
            })
            .map(|entry| entry.node_id)
            .collect()
    }
}
