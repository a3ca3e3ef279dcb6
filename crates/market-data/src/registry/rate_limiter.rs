//! Per-source rate limiting.
//!
//! Each source has a minimum interval between requests. A caller acquiring a
//! slot for a source holds that source's async lock while it waits out the
//! remaining interval, which serializes concurrent workers hitting the same
//! source without serializing requests to different sources.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::sync::Mutex as AsyncMutex;

use crate::models::Source;

/// Default minimum interval between requests to one source.
///
/// Conservative: scraped platforms deploy anti-bot measures well below
/// one request per second.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Per-source request pacing state.
#[derive(Debug, Default)]
struct Pace {
    last_request: Option<Instant>,
}

/// Rate limiter shared by all workers talking to the sources.
///
/// Thread-safe: the registry map is guarded by a std mutex (held only for
/// lookups), while waiting happens under a per-source async mutex.
pub struct RateLimiter {
    paces: Mutex<HashMap<Source, Arc<AsyncMutex<Pace>>>>,
    intervals: Mutex<HashMap<Source, Duration>>,
    default_interval: Duration,
}

impl RateLimiter {
    /// Create a rate limiter with the default per-source interval.
    pub fn new() -> Self {
        Self::with_default_interval(DEFAULT_MIN_INTERVAL)
    }

    /// Create a rate limiter with a custom default interval.
    pub fn with_default_interval(default_interval: Duration) -> Self {
        Self {
            paces: Mutex::new(HashMap::new()),
            intervals: Mutex::new(HashMap::new()),
            default_interval,
        }
    }

    /// Lock the pace map, recovering from poison if necessary.
    ///
    /// Worst case after recovery is one mistimed request, which beats
    /// panicking the whole search.
    fn lock_paces(&self) -> MutexGuard<'_, HashMap<Source, Arc<AsyncMutex<Pace>>>> {
        self.paces.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter pace map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_intervals(&self) -> MutexGuard<'_, HashMap<Source, Duration>> {
        self.intervals.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter interval map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Set the minimum interval for one source.
    pub fn set_interval(&self, source: Source, interval: Duration) {
        self.lock_intervals().insert(source, interval);
    }

    /// The minimum interval currently applied to one source.
    pub fn interval(&self, source: Source) -> Duration {
        self.lock_intervals()
            .get(&source)
            .copied()
            .unwrap_or(self.default_interval)
    }

    /// Wait until a request to `source` is allowed, then claim the slot.
    ///
    /// Holding the per-source lock across the wait serializes same-source
    /// callers; distinct sources proceed in parallel.
    pub async fn acquire(&self, source: Source) {
        let pace = {
            let mut paces = self.lock_paces();
            paces.entry(source).or_default().clone()
        };
        let interval = self.interval(source);

        let mut guard = pace.lock().await;
        if let Some(last) = guard.last_request {
            let elapsed = last.elapsed();
            if elapsed < interval {
                let wait = interval - elapsed;
                debug!("Rate limiting {source}: waiting {wait:?}");
                tokio::time::sleep(wait).await;
            }
        }
        guard.last_request = Some(Instant::now());
    }

    /// Forget the last-request timestamp for one source, or all of them.
    pub fn reset(&self, source: Option<Source>) {
        let mut paces = self.lock_paces();
        match source {
            Some(source) => {
                paces.remove(&source);
            }
            None => paces.clear(),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
