use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio::time::timeout;
use tracing::warn;

use crate::error::{Error, Result};
use crate::path::CancelToken;

/// Hard ceiling on how long a single route computation may run.
pub const DEFAULT_ROUTE_DEADLINE: Duration = Duration::from_secs(45);

/// How many route computations may run at the same time.
pub const DEFAULT_MAX_WORKERS: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    pub max_workers: usize,
    pub deadline: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            deadline: DEFAULT_ROUTE_DEADLINE,
        }
    }
}

/// Runs route computations on blocking threads behind a bounded worker pool.
///
/// Callers beyond the pool size queue for a slot rather than failing. Each
/// job gets a cancellation token; when the deadline passes the token is
/// cancelled, the caller gets [`Error::Timeout`] and the worker winds down at
/// its next cancellation check.
#[derive(Debug, Clone)]
pub struct RouteExecutor {
    permits: Arc<Semaphore>,
    deadline: Duration,
    active: Arc<AtomicUsize>,
}

impl RouteExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(config.max_workers.max(1))),
            deadline: config.deadline,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of computations currently holding a worker slot.
    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Run `work` to completion, returning exactly one outcome.
    ///
    /// A panic inside `work` is contained and reported as
    /// [`Error::Computation`]; the pool and its other workers are unaffected.
    pub async fn execute<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&CancelToken) -> Result<T> + Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::Computation("worker pool is shut down".to_string()))?;

        let token = CancelToken::new();
        let job_token = token.clone();
        let active = Arc::clone(&self.active);

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _slot = ActiveSlot::enter(&active);
            work(&job_token)
        });

        match timeout(self.deadline, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                let detail = join_failure(join_error);
                warn!(%detail, "route computation failed");
                Err(Error::Computation(detail))
            }
            Err(_) => {
                token.cancel();
                let seconds = self.deadline.as_secs();
                warn!(seconds, "route computation exceeded its deadline");
                Err(Error::Timeout { seconds })
            }
        }
    }
}

/// Occupancy guard keeping the active-worker gauge balanced, panics included.
struct ActiveSlot {
    counter: Arc<AtomicUsize>,
}

impl ActiveSlot {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        let now = counter.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::gauge!("evemaps_route_active_workers").set(now as f64);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        let now = self.counter.fetch_sub(1, Ordering::Relaxed) - 1;
        metrics::gauge!("evemaps_route_active_workers").set(now as f64);
    }
}

fn join_failure(error: JoinError) -> String {
    if error.is_panic() {
        let payload = error.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        format!("route worker panicked: {message}")
    } else {
        "route worker was cancelled".to_string()
    }
}
