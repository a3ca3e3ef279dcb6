//! Benchmark resolution.
//!
//! Finds the instrument behind a benchmark ISIN through three tiers, fastest
//! first: the already-loaded universe, the local cache, and finally the
//! external sources in priority order. An external hit must carry at least
//! one useful mid/long-horizon return, otherwise the next source is tried.

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use fundscope_market_data::models::isin;
use fundscope_market_data::{AggregatedInstrument, Period, SourceRecord};
use fundscope_market_data::source::DataSource;

use crate::constants::PRELOAD_CAP;
use crate::universe::UniverseInstrument;

use super::cache::BenchmarkCache;

/// Outcome of preloading one identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadedBenchmark {
    pub isin: String,
    pub name: String,
    /// True when the entry was already cached.
    pub cached: bool,
}

/// Why one identifier failed to preload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreloadFailure {
    InvalidIsin,
    NotFound,
    /// Beyond the per-call cap; resubmit in a later batch.
    OverCap,
}

/// Outcome of a bulk preload call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreloadReport {
    pub loaded: Vec<PreloadedBenchmark>,
    pub failed: Vec<(String, PreloadFailure)>,
}

/// Three-tier benchmark lookup with cache write-back.
pub struct BenchmarkResolver {
    sources: Vec<Arc<dyn DataSource>>,
    cache: Arc<BenchmarkCache>,
}

impl BenchmarkResolver {
    /// Create a resolver. `sources` must already be in priority order; the
    /// first source with a usable result wins.
    pub fn new(sources: Vec<Arc<dyn DataSource>>, cache: Arc<BenchmarkCache>) -> Self {
        Self { sources, cache }
    }

    pub fn cache(&self) -> &BenchmarkCache {
        &self.cache
    }

    /// Resolve a benchmark by ISIN.
    ///
    /// Tier order: loaded universe, cache, external sources. Returns `None`
    /// for an invalid ISIN without consulting any tier, and `None` when every
    /// tier misses — resolution failure is a value, not an error.
    pub async fn resolve(
        &self,
        code: &str,
        universe: &[UniverseInstrument],
    ) -> Option<AggregatedInstrument> {
        if !isin::is_valid(code) {
            warn!("Invalid benchmark ISIN: {code}");
            return None;
        }
        let key = isin::normalize(code);

        if let Some(inst) = universe.iter().find(|inst| inst.isin == key) {
            let resolved = inst.to_aggregated();
            info!("Benchmark {key} found in universe: {}", resolved.name);
            return Some(resolved);
        }

        if let Some(cached) = self.cache.get(&key) {
            info!("Benchmark {key} found in cache: {}", cached.name);
            return Some(cached);
        }

        info!("Benchmark {key} not in universe/cache, trying external sources...");
        let fetched = self.fetch_external(&key).await?;
        self.cache.insert(fetched.clone());
        Some(fetched)
    }

    /// Try each source in order, accepting the first result that carries a
    /// useful return. A metadata-only hit counts as a miss.
    async fn fetch_external(&self, key: &str) -> Option<AggregatedInstrument> {
        for source in &self.sources {
            let id = source.id();
            match source.get_by_isin(key).await {
                Ok(Some(record)) if has_useful_performance(&record) => {
                    info!("Benchmark {key} found on {id} with performance data");
                    return Some(record_to_benchmark(record));
                }
                Ok(Some(_)) => {
                    info!("Benchmark {key} found on {id} but without useful performance");
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("{id} lookup failed for {key}: {err}");
                }
            }
        }

        warn!("Benchmark {key} not found on any source");
        None
    }

    /// Pre-warm the cache for a list of ISINs.
    ///
    /// At most [`PRELOAD_CAP`] identifiers are resolved per call; the rest
    /// are reported as failed with an explicit over-cap reason.
    pub async fn preload(&self, codes: &[String]) -> PreloadReport {
        let mut report = PreloadReport::default();

        for (idx, raw) in codes.iter().enumerate() {
            let key = isin::normalize(raw);
            if key.is_empty() {
                continue;
            }

            if idx >= PRELOAD_CAP {
                report.failed.push((key, PreloadFailure::OverCap));
                continue;
            }
            if !isin::is_valid(&key) {
                report.failed.push((key, PreloadFailure::InvalidIsin));
                continue;
            }

            if let Some(cached) = self.cache.get(&key) {
                report.loaded.push(PreloadedBenchmark {
                    isin: key,
                    name: cached.name,
                    cached: true,
                });
                continue;
            }

            match self.fetch_external(&key).await {
                Some(instrument) => {
                    self.cache.insert(instrument.clone());
                    report.loaded.push(PreloadedBenchmark {
                        isin: key,
                        name: instrument.name,
                        cached: false,
                    });
                }
                None => report.failed.push((key, PreloadFailure::NotFound)),
            }
        }

        report
    }
}

/// A benchmark is usable only with at least one of the 1y/3y/5y returns.
fn has_useful_performance(record: &SourceRecord) -> bool {
    [Period::OneYear, Period::ThreeYears, Period::FiveYears]
        .iter()
        .any(|period| record.performance.get(*period).is_some())
}

/// Shape a single source record as a benchmark instrument.
fn record_to_benchmark(record: SourceRecord) -> AggregatedInstrument {
    AggregatedInstrument {
        isin: isin::normalize(&record.isin),
        name: record.name,
        kind: record.kind,
        currency: record.currency,
        domicile: record.domicile,
        distribution: record.distribution,
        category_morningstar: record.category_morningstar,
        category_assogestioni: record.category_assogestioni,
        ter: record.ter,
        aum: record.aum,
        performance: record.performance,
        risk: record.risk,
        sources: vec![record.source],
        data_quality_score: 0.0,
        last_updated: record.retrieved_at,
    }
}
