//! Time-bounded cache of resolved benchmarks.
//!
//! Keeps externally-fetched benchmarks around for a day so repeated
//! comparisons don't re-scrape. Constructor-injected: every engine (and
//! every test) gets its own instance.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use fundscope_market_data::models::isin;
use fundscope_market_data::AggregatedInstrument;

use crate::constants::BENCHMARK_CACHE_TTL;

#[derive(Debug, Clone)]
struct CacheEntry {
    instrument: AggregatedInstrument,
    inserted_at: Instant,
}

/// Summary of the cache contents, with expired entries already purged.
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub count: usize,
    pub isins: Vec<String>,
    /// Time until the oldest live entry expires; `None` when empty.
    pub expires_in: Option<Duration>,
}

/// ISIN-keyed benchmark cache with a fixed time-to-live.
pub struct BenchmarkCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl BenchmarkCache {
    /// Create a cache with the default 24-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(BENCHMARK_CACHE_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Lock the entry map, recovering from poison if necessary.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Benchmark cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Fetch a cached benchmark, dropping it if expired.
    pub fn get(&self, code: &str) -> Option<AggregatedInstrument> {
        let key = isin::normalize(code);
        let mut entries = self.lock_entries();

        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                debug!("Benchmark {key} found in cache");
                Some(entry.instrument.clone())
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store a resolved benchmark.
    pub fn insert(&self, instrument: AggregatedInstrument) {
        let key = isin::normalize(&instrument.isin);
        info!("Benchmark {key} added to cache");
        self.lock_entries().insert(
            key,
            CacheEntry {
                instrument,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock_entries().clear();
        info!("Benchmark cache cleared");
    }

    /// Report live contents, lazily purging expired entries.
    pub fn status(&self) -> CacheStatus {
        let mut entries = self.lock_entries();
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);

        let oldest_age = entries
            .values()
            .map(|entry| entry.inserted_at.elapsed())
            .max();

        CacheStatus {
            count: entries.len(),
            isins: entries.keys().cloned().collect(),
            expires_in: oldest_age.map(|age| self.ttl.saturating_sub(age)),
        }
    }
}

impl Default for BenchmarkCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fundscope_market_data::{PerformanceData, RiskMetrics};

    fn instrument(code: &str) -> AggregatedInstrument {
        AggregatedInstrument {
            isin: code.to_string(),
            name: format!("ETF {code}"),
            kind: Default::default(),
            currency: "EUR".to_string(),
            domicile: None,
            distribution: Default::default(),
            category_morningstar: None,
            category_assogestioni: None,
            ter: None,
            aum: None,
            performance: PerformanceData::default(),
            risk: RiskMetrics::default(),
            sources: Vec::new(),
            data_quality_score: 0.0,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = BenchmarkCache::new();
        cache.insert(instrument("IE00B4L5Y983"));

        assert!(cache.get("IE00B4L5Y983").is_some());
        assert!(cache.get("LU0323578657").is_none());
    }

    #[test]
    fn test_keys_are_normalized() {
        let cache = BenchmarkCache::new();
        cache.insert(instrument("IE00B4L5Y983"));

        assert!(cache.get(" ie00b4l5y983 ").is_some());
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let cache = BenchmarkCache::with_ttl(Duration::ZERO);
        cache.insert(instrument("IE00B4L5Y983"));

        assert!(cache.get("IE00B4L5Y983").is_none());
    }

    #[test]
    fn test_status_purges_expired() {
        let cache = BenchmarkCache::with_ttl(Duration::ZERO);
        cache.insert(instrument("IE00B4L5Y983"));
        cache.insert(instrument("LU0323578657"));

        let status = cache.status();
        assert_eq!(status.count, 0);
        assert!(status.isins.is_empty());
        assert!(status.expires_in.is_none());
    }

    #[test]
    fn test_status_reports_live_entries() {
        let cache = BenchmarkCache::new();
        cache.insert(instrument("IE00B4L5Y983"));

        let status = cache.status();
        assert_eq!(status.count, 1);
        assert_eq!(status.isins, vec!["IE00B4L5Y983".to_string()]);
        assert!(status.expires_in.is_some());
    }

    #[test]
    fn test_clear() {
        let cache = BenchmarkCache::new();
        cache.insert(instrument("IE00B4L5Y983"));
        cache.clear();

        assert_eq!(cache.status().count, 0);
    }
}
