use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Tracked (client, class) pairs above which lapsed windows get pruned.
const MAX_TRACKED_WINDOWS: usize = 4096;

/// Request classes limited independently for each client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateClass {
    /// Every routing endpoint, counted together.
    General,
    /// Direct origin-to-destination route requests.
    Direct,
    /// Route requests carrying waypoints.
    Waypoint,
}

#[derive(Debug, Clone, Copy)]
pub struct RateQuota {
    pub limit: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct LimiterConfig {
    pub general: RateQuota,
    pub direct: RateQuota,
    pub waypoint: RateQuota,
}

impl LimiterConfig {
    pub fn quota(&self, class: RateClass) -> RateQuota {
        match class {
            RateClass::General => self.general,
            RateClass::Direct => self.direct,
            RateClass::Waypoint => self.waypoint,
        }
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        let window = Duration::from_secs(60);
        Self {
            general: RateQuota { limit: 60, window },
            direct: RateQuota { limit: 15, window },
            waypoint: RateQuota { limit: 5, window },
        }
    }
}

struct Window {
    started: Instant,
    count: u32,
}

/// Per-client fixed-window request limiter.
///
/// Every (client, class) pair owns an independent window anchored at its
/// first request. A request after the window lapses starts a fresh window;
/// requests beyond the limit are rejected immediately without extending it.
pub struct RateLimiter {
    config: LimiterConfig,
    windows: Mutex<HashMap<(String, RateClass), Window>>,
}

impl RateLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request against `client` in `class`.
    ///
    /// Fails with [`Error::RateLimited`] carrying the seconds left until the
    /// window resets.
    pub fn check(&self, client: &str, class: RateClass) -> Result<()> {
        let quota = self.config.quota(class);
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if windows.len() > MAX_TRACKED_WINDOWS {
            let config = self.config;
            windows.retain(|(_, class), window| {
                window.started.elapsed() < config.quota(*class).window
            });
        }

        let window = windows
            .entry((client.to_string(), class))
            .or_insert_with(|| Window {
                started: Instant::now(),
                count: 0,
            });

        if window.started.elapsed() >= quota.window {
            window.started = Instant::now();
            window.count = 0;
        }

        window.count += 1;
        if window.count > quota.limit {
            let remaining = quota.window.saturating_sub(window.started.elapsed());
            return Err(Error::RateLimited {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(LimiterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_requests_stop_at_fifteen() {
        let limiter = RateLimiter::default();
        for _ in 0..15 {
            limiter.check("client", RateClass::Direct).unwrap();
        }
        let error = limiter.check("client", RateClass::Direct).unwrap_err();
        assert!(matches!(error, Error::RateLimited { .. }));
    }

    #[test]
    fn waypoint_requests_stop_at_five() {
        let limiter = RateLimiter::default();
        for _ in 0..5 {
            limiter.check("client", RateClass::Waypoint).unwrap();
        }
        assert!(limiter.check("client", RateClass::Waypoint).is_err());
    }

    #[test]
    fn classes_and_clients_are_independent() {
        let limiter = RateLimiter::default();
        for _ in 0..5 {
            limiter.check("alice", RateClass::Waypoint).unwrap();
        }
        assert!(limiter.check("alice", RateClass::Waypoint).is_err());

        limiter.check("alice", RateClass::Direct).unwrap();
        limiter.check("bob", RateClass::Waypoint).unwrap();
    }

    #[test]
    fn lapsed_windows_reset() {
        let config = LimiterConfig {
            general: RateQuota {
                limit: 1,
                window: Duration::from_millis(10),
            },
            ..LimiterConfig::default()
        };
        let limiter = RateLimiter::new(config);

        limiter.check("client", RateClass::General).unwrap();
        assert!(limiter.check("client", RateClass::General).is_err());

        std::thread::sleep(Duration::from_millis(20));
        limiter.check("client", RateClass::General).unwrap();
    }

    #[test]
    fn rejection_reports_time_until_reset() {
        let limiter = RateLimiter::default();
        for _ in 0..5 {
            limiter.check("client", RateClass::Waypoint).unwrap();
        }
        match limiter.check("client", RateClass::Waypoint) {
            Err(Error::RateLimited { retry_after_secs }) => {
                assert!(retry_after_secs >= 1);
                assert!(retry_after_secs <= 60);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
