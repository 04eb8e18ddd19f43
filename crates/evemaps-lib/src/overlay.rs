use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::universe::{Jump, ShipSize, SystemId};

/// Production endpoint of the EVE-Scout public API.
pub const EVE_SCOUT_BASE_URL: &str = "https://api.eve-scout.com/v2/public/";

/// How long a fetched set of signatures remains fresh.
const PROVIDER_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Which public wormhole networks a request wants folded into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OverlayFlags {
    pub use_thera: bool,
    pub use_turnur: bool,
}

impl OverlayFlags {
    pub fn any(self) -> bool {
        self.use_thera || self.use_turnur
    }
}

/// Source of short-lived connections layered over the static graph.
#[async_trait]
pub trait OverlayProvider: Send + Sync {
    /// Connections matching the requested networks, in both directions.
    ///
    /// Must return an empty set without side effects when no network is
    /// requested.
    async fn connections(&self, flags: OverlayFlags) -> Result<Vec<Jump>>;
}

/// A scouted wormhole as reported by the EVE-Scout signature feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoutSignature {
    pub out_system_id: SystemId,
    pub out_system_name: String,
    #[serde(default)]
    pub in_system_id: Option<SystemId>,
    #[serde(default)]
    pub in_region_name: Option<String>,
    #[serde(default)]
    pub max_ship_size: Option<String>,
}

impl ScoutSignature {
    fn hub(&self, name: &str) -> bool {
        self.out_system_name.eq_ignore_ascii_case(name)
            || self
                .in_region_name
                .as_deref()
                .is_some_and(|region| region.eq_ignore_ascii_case(name))
    }

    fn wanted(&self, flags: OverlayFlags) -> bool {
        if self.hub("thera") && !flags.use_thera {
            return false;
        }
        if self.hub("turnur") && !flags.use_turnur {
            return false;
        }
        true
    }

    fn ship_size(&self) -> ShipSize {
        self.max_ship_size
            .as_deref()
            .map(ShipSize::parse)
            .unwrap_or(ShipSize::Unknown)
    }
}

fn signature_edges(signatures: &[ScoutSignature], flags: OverlayFlags) -> Vec<Jump> {
    let mut edges = Vec::new();
    for signature in signatures {
        if !signature.wanted(flags) {
            continue;
        }
        // Signatures without a charted inward system cannot be routed through.
        let Some(inward) = signature.in_system_id else {
            continue;
        };
        let size = Some(signature.ship_size());
        edges.push(Jump {
            from: inward,
            to: signature.out_system_id,
            max_ship_size: size,
        });
        edges.push(Jump {
            from: signature.out_system_id,
            to: inward,
            max_ship_size: size,
        });
    }
    edges
}

struct FetchedSignatures {
    signatures: Vec<ScoutSignature>,
    fetched: Instant,
}

/// Overlay provider backed by the EVE-Scout public signature feed.
///
/// Fetched signatures are cached for thirty minutes; concurrent refreshes are
/// serialized so the upstream API sees at most one request per expiry.
pub struct EveScoutProvider {
    client: reqwest::Client,
    base_url: String,
    ttl: Duration,
    cache: Mutex<Option<FetchedSignatures>>,
}

impl EveScoutProvider {
    pub fn new() -> Result<Self> {
        Self::with_base_url(EVE_SCOUT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("evemaps/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            ttl: PROVIDER_CACHE_TTL,
            cache: Mutex::new(None),
        })
    }

    /// Override the cache lifetime, mainly for tests.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    async fn signatures(&self) -> Result<Vec<ScoutSignature>> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched.elapsed() < self.ttl {
                return Ok(cached.signatures.clone());
            }
        }

        let url = format!("{}signatures", self.base_url);
        debug!(%url, "refreshing wormhole signatures");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let signatures: Vec<ScoutSignature> = response.json().await?;
        debug!(count = signatures.len(), "fetched wormhole signatures");

        *cache = Some(FetchedSignatures {
            signatures: signatures.clone(),
            fetched: Instant::now(),
        });
        Ok(signatures)
    }
}

#[async_trait]
impl OverlayProvider for EveScoutProvider {
    async fn connections(&self, flags: OverlayFlags) -> Result<Vec<Jump>> {
        if !flags.any() {
            return Ok(Vec::new());
        }
        let signatures = self.signatures().await?;
        Ok(signature_edges(&signatures, flags))
    }
}

/// Collect overlay connections from every configured provider.
///
/// A failing provider fails the whole collection; routing with a silently
/// missing overlay would contradict what the caller asked for.
pub async fn gather_overlay_edges(
    providers: &[Arc<dyn OverlayProvider>],
    flags: OverlayFlags,
) -> Result<Vec<Jump>> {
    let mut edges = Vec::new();
    for provider in providers {
        edges.extend(provider.connections(flags).await?);
    }
    Ok(edges)
}
