use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

/// How long a finished route result stays reusable.
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry<V> {
    value: V,
    created: Instant,
}

/// Fingerprint-keyed cache of finished computations with a fixed lifetime.
///
/// Entries expire a fixed time after insertion. Expiry is enforced lazily on
/// reads and by a periodic sweep. Identical requests racing a cold key may
/// both compute and insert; the cache makes no single-flight promise.
pub struct ResultCache<V> {
    entries: Arc<Mutex<HashMap<u64, Entry<V>>>>,
    ttl: Duration,
}

impl<V> Clone for ResultCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
        }
    }
}

impl<V: Clone> ResultCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a live entry, removing it when its lifetime has passed.
    pub fn get(&self, key: u64) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&key) {
            Some(entry) if entry.created.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: u64, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            Entry {
                value,
                created: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry.
    pub fn sweep(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.created.elapsed() < self.ttl);
        let swept = before - entries.len();
        if swept > 0 {
            debug!(swept, remaining = entries.len(), "swept expired route results");
        }
    }
}

impl<V: Clone + Send + 'static> ResultCache<V> {
    /// Start a background task that sweeps once per entry lifetime.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let period = cache.ttl.max(Duration::from_millis(1));
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; skip it so sweeps start one
            // full lifetime after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.sweep();
            }
        })
    }
}
