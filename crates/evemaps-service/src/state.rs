//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use evemaps_lib::{
    EveScoutProvider, OverlayProvider, RateLimiter, ResultCache, RouteExecutor, StatusStore,
    UniverseStore,
};

use crate::config::ServiceConfig;
use crate::routes::RouteResponse;

/// Application state shared across all axum handlers. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServiceConfig,
    universe: UniverseStore,
    status: StatusStore,
    providers: Vec<Arc<dyn OverlayProvider>>,
    executor: RouteExecutor,
    cache: ResultCache<RouteResponse>,
    limiter: RateLimiter,
}

impl AppState {
    /// Build state from configuration with the standard overlay providers.
    ///
    /// The universe dataset itself loads lazily on first use, so a missing
    /// file surfaces as a 503 on the first routing request instead of a
    /// startup failure.
    pub fn new(config: ServiceConfig) -> evemaps_lib::Result<Self> {
        let scout = EveScoutProvider::with_base_url(config.scout_url.clone())?;
        Self::with_providers(config, vec![Arc::new(scout)])
    }

    /// Build state with explicit overlay providers. Tests inject stubs here.
    pub fn with_providers(
        config: ServiceConfig,
        providers: Vec<Arc<dyn OverlayProvider>>,
    ) -> evemaps_lib::Result<Self> {
        let status = StatusStore::new(config.status_path.as_deref())?;
        let universe = UniverseStore::new(&config.universe_path);
        let executor = RouteExecutor::new(config.executor);
        let cache = ResultCache::new(config.result_ttl);
        let limiter = RateLimiter::new(config.limits);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                universe,
                status,
                providers,
                executor,
                cache,
                limiter,
            }),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn universe(&self) -> &UniverseStore {
        &self.inner.universe
    }

    pub fn status(&self) -> &StatusStore {
        &self.inner.status
    }

    pub fn providers(&self) -> &[Arc<dyn OverlayProvider>] {
        &self.inner.providers
    }

    pub fn executor(&self) -> &RouteExecutor {
        &self.inner.executor
    }

    pub fn cache(&self) -> &ResultCache<RouteResponse> {
        &self.inner.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("universe_loaded", &self.inner.universe.is_loaded())
            .field("status_entries", &self.inner.status.len())
            .field("overlay_providers", &self.inner.providers.len())
            .field("active_workers", &self.inner.executor.active_workers())
            .finish()
    }
}
