//! Multi-source search orchestration.
//!
//! Fans a search out across the configured sources with a bounded worker
//! pool, isolates per-source failures, merges the raw records by ISIN, and
//! applies post-merge filters. A failing or timed-out source contributes
//! zero records; it never aborts the batch.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{error, info, warn};
use tokio::sync::Semaphore;
use tokio::time::timeout;

use super::config::SearchConfig;
use super::rate_limiter::RateLimiter;
use crate::errors::RetryClass;
use crate::merge::RecordMerger;
use crate::models::{AggregatedInstrument, SearchCriteria, Source, SourceRecord};
use crate::progress::{report, ProgressCallback};
use crate::source::{DataSource, InstrumentFetcher};

/// Default source priority for conflict resolution.
///
/// Morningstar carries the richest fund data, JustETF the richest ETF data;
/// Investing.com fills gaps.
pub const DEFAULT_SOURCE_PRIORITY: [Source; 3] =
    [Source::Morningstar, Source::JustEtf, Source::Investing];

/// Share of the progress range spent on fetching (the rest is merge/filter).
const FETCH_PROGRESS_SHARE: f64 = 0.7;

/// Coordinates searches across all configured sources.
pub struct SearchOrchestrator {
    sources: Vec<Arc<dyn DataSource>>,
    merger: RecordMerger,
    rate_limiter: Arc<RateLimiter>,
    source_priority: Vec<Source>,
    config: SearchConfig,
}

impl SearchOrchestrator {
    pub fn new(sources: Vec<Arc<dyn DataSource>>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self::with_config(sources, rate_limiter, SearchConfig::default())
    }

    pub fn with_config(
        sources: Vec<Arc<dyn DataSource>>,
        rate_limiter: Arc<RateLimiter>,
        config: SearchConfig,
    ) -> Self {
        Self {
            sources,
            merger: RecordMerger::new(),
            rate_limiter,
            source_priority: DEFAULT_SOURCE_PRIORITY.to_vec(),
            config,
        }
    }

    /// Override the source priority used for conflict resolution.
    pub fn with_source_priority(mut self, priority: Vec<Source>) -> Self {
        self.source_priority = priority;
        self
    }

    /// The sources this orchestrator queries.
    pub fn available_sources(&self) -> Vec<Source> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Search every applicable source and merge the results.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        progress: Option<ProgressCallback>,
    ) -> Vec<AggregatedInstrument> {
        let active: Vec<&Arc<dyn DataSource>> = self
            .sources
            .iter()
            .filter(|source| {
                source
                    .supported_kinds()
                    .iter()
                    .any(|kind| criteria.instrument_kinds.contains(kind))
            })
            .collect();

        if active.is_empty() {
            warn!("No active sources for the requested instrument kinds");
            return Vec::new();
        }

        report(progress.as_ref(), 0.0, "Starting multi-source search...");

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let total = active.len();

        let fetches = active.iter().enumerate().map(|(idx, source)| {
            let semaphore = semaphore.clone();
            let source = Arc::clone(source);
            let scaled = scale_progress(progress.clone(), source.id(), idx, total);
            async move {
                // Semaphore close is not used; acquisition cannot fail.
                let _permit = semaphore.acquire().await.expect("semaphore open");
                self.search_one(source.as_ref(), criteria, scaled).await
            }
        });

        let all_records: Vec<SourceRecord> =
            join_all(fetches).await.into_iter().flatten().collect();

        report(
            progress.as_ref(),
            FETCH_PROGRESS_SHARE,
            "Aggregating results...",
        );

        let mut aggregated = self.merger.merge(all_records, &self.source_priority);

        report(progress.as_ref(), 0.9, "Applying final filters...");

        if let Some(min_perf) = criteria.min_performance {
            let period = criteria.performance_period;
            aggregated.retain(|inst| {
                inst.performance_for(period)
                    .is_some_and(|perf| perf >= min_perf)
            });
        }

        report(
            progress.as_ref(),
            1.0,
            &format!("Done: {} instruments found", aggregated.len()),
        );

        aggregated
    }

    /// Query one source with rate limiting, a timeout, and one backoff retry
    /// for transient failures. Failures degrade to an empty record list.
    async fn search_one(
        &self,
        source: &dyn DataSource,
        criteria: &SearchCriteria,
        progress: Option<ProgressCallback>,
    ) -> Vec<SourceRecord> {
        let id = source.id();

        for attempt in 0..2 {
            self.rate_limiter.acquire(id).await;

            match timeout(
                self.config.source_timeout,
                source.search(criteria, progress.clone()),
            )
            .await
            {
                Ok(Ok(records)) => {
                    info!("{id}: found {} records", records.len());
                    return records;
                }
                Ok(Err(err)) => {
                    if attempt == 0 && err.retry_class() == RetryClass::WithBackoff {
                        warn!("{id} failed transiently ({err}), retrying once");
                        tokio::time::sleep(self.config.retry_backoff).await;
                        continue;
                    }
                    error!("{id} failed: {err}");
                    return Vec::new();
                }
                Err(_) => {
                    error!(
                        "{id} timed out after {:?}",
                        self.config.source_timeout
                    );
                    return Vec::new();
                }
            }
        }

        Vec::new()
    }

    /// Look up each ISIN on every source and merge what comes back.
    ///
    /// Lookups run sequentially under the rate limiter; a failed lookup is
    /// logged and skipped.
    pub async fn enrich_by_isins(
        &self,
        isins: &[String],
        progress: Option<ProgressCallback>,
    ) -> Vec<AggregatedInstrument> {
        let mut all_records = Vec::new();
        let total = isins.len() * self.sources.len();
        let mut current = 0usize;

        for code in isins {
            for source in &self.sources {
                let id = source.id();
                self.rate_limiter.acquire(id).await;

                match timeout(self.config.source_timeout, source.get_by_isin(code)).await {
                    Ok(Ok(Some(record))) => all_records.push(record),
                    Ok(Ok(None)) => {}
                    Ok(Err(err)) => warn!("Failed to get {code} from {id}: {err}"),
                    Err(_) => warn!("Lookup of {code} on {id} timed out"),
                }

                current += 1;
                report(
                    progress.as_ref(),
                    current as f64 / total.max(1) as f64,
                    &format!("Lookup {code}..."),
                );
            }
        }

        self.merger.merge(all_records, &self.source_priority)
    }

    /// Probe every source, mapping probe failures to `false`.
    pub async fn health_check(&self) -> Vec<(Source, bool)> {
        let mut status = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            status.push((source.id(), source.health_check().await));
        }
        status
    }
}

#[async_trait]
impl InstrumentFetcher for SearchOrchestrator {
    async fn search(
        &self,
        criteria: &SearchCriteria,
        progress: Option<ProgressCallback>,
    ) -> Vec<AggregatedInstrument> {
        SearchOrchestrator::search(self, criteria, progress).await
    }

    async fn enrich_by_isins(
        &self,
        isins: &[String],
        progress: Option<ProgressCallback>,
    ) -> Vec<AggregatedInstrument> {
        SearchOrchestrator::enrich_by_isins(self, isins, progress).await
    }
}

/// Scale a source's 0-1 progress into its slice of the overall fetch range,
/// tagging messages with the source id.
fn scale_progress(
    outer: Option<ProgressCallback>,
    source: Source,
    index: usize,
    total: usize,
) -> Option<ProgressCallback> {
    outer.map(|cb| {
        let callback: ProgressCallback = Arc::new(move |p: f64, message: &str| {
            let base = index as f64 / total as f64;
            let overall = (base + p.clamp(0.0, 1.0) / total as f64) * FETCH_PROGRESS_SHARE;
            cb(overall, &format!("[{source}] {message}"));
        });
        callback
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use crate::models::{InstrumentKind, PerformanceData, Period};
    use std::time::Duration;

    /// Canned source for orchestration tests.
    struct FakeSource {
        id: Source,
        kinds: Vec<InstrumentKind>,
        records: Vec<SourceRecord>,
        fail: bool,
    }

    impl FakeSource {
        fn with_records(id: Source, records: Vec<SourceRecord>) -> Self {
            Self {
                id,
                kinds: vec![InstrumentKind::Etf, InstrumentKind::Fund],
                records,
                fail: false,
            }
        }

        fn failing(id: Source) -> Self {
            Self {
                id,
                kinds: vec![InstrumentKind::Etf, InstrumentKind::Fund],
                records: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl DataSource for FakeSource {
        fn id(&self) -> Source {
            self.id
        }

        fn supported_kinds(&self) -> &[InstrumentKind] {
            &self.kinds
        }

        async fn search(
            &self,
            _criteria: &SearchCriteria,
            _progress: Option<ProgressCallback>,
        ) -> Result<Vec<SourceRecord>, SourceError> {
            if self.fail {
                return Err(SourceError::Parse {
                    from_source: self.id,
                    message: "unexpected html".to_string(),
                });
            }
            Ok(self.records.clone())
        }

        async fn get_by_isin(&self, code: &str) -> Result<Option<SourceRecord>, SourceError> {
            if self.fail {
                return Err(SourceError::Parse {
                    from_source: self.id,
                    message: "unexpected html".to_string(),
                });
            }
            Ok(self.records.iter().find(|r| r.isin == code).cloned())
        }
    }

    fn orchestrator(sources: Vec<Arc<dyn DataSource>>) -> SearchOrchestrator {
        let limiter = Arc::new(RateLimiter::with_default_interval(Duration::ZERO));
        SearchOrchestrator::new(sources, limiter)
    }

    fn record_with_3y(isin: &str, source: Source, return_3y: f64) -> SourceRecord {
        let mut record = SourceRecord::new(isin, format!("Fund {isin}"), source);
        record.performance = PerformanceData {
            return_3y: Some(return_3y),
            ..Default::default()
        };
        record
    }

    #[tokio::test]
    async fn test_search_merges_across_sources() {
        let sources: Vec<Arc<dyn DataSource>> = vec![
            Arc::new(FakeSource::with_records(
                Source::JustEtf,
                vec![record_with_3y("IE00B4L5Y983", Source::JustEtf, 8.0)],
            )),
            Arc::new(FakeSource::with_records(
                Source::Morningstar,
                vec![record_with_3y("IE00B4L5Y983", Source::Morningstar, 8.2)],
            )),
        ];

        let result = orchestrator(sources)
            .search(&SearchCriteria::default(), None)
            .await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sources.len(), 2);
        // Morningstar has priority.
        assert_eq!(result[0].performance.return_3y, Some(8.2));
    }

    #[tokio::test]
    async fn test_one_failing_source_does_not_abort_batch() {
        let sources: Vec<Arc<dyn DataSource>> = vec![
            Arc::new(FakeSource::failing(Source::Morningstar)),
            Arc::new(FakeSource::with_records(
                Source::JustEtf,
                vec![record_with_3y("IE00B4L5Y983", Source::JustEtf, 8.0)],
            )),
        ];

        let result = orchestrator(sources)
            .search(&SearchCriteria::default(), None)
            .await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sources, vec![Source::JustEtf]);
    }

    #[tokio::test]
    async fn test_sources_filtered_by_instrument_kind() {
        let mut etf_only = FakeSource::with_records(
            Source::JustEtf,
            vec![record_with_3y("IE00B4L5Y983", Source::JustEtf, 8.0)],
        );
        etf_only.kinds = vec![InstrumentKind::Etf];

        let criteria = SearchCriteria {
            instrument_kinds: vec![InstrumentKind::Fund],
            ..Default::default()
        };

        let result = orchestrator(vec![Arc::new(etf_only)]).search(&criteria, None).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_min_performance_filter() {
        let sources: Vec<Arc<dyn DataSource>> = vec![Arc::new(FakeSource::with_records(
            Source::JustEtf,
            vec![
                record_with_3y("IE00B4L5Y983", Source::JustEtf, 12.0),
                record_with_3y("LU0323578657", Source::JustEtf, 3.0),
            ],
        ))];

        let criteria = SearchCriteria {
            min_performance: Some(5.0),
            performance_period: Period::ThreeYears,
            ..Default::default()
        };

        let result = orchestrator(sources).search(&criteria, None).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].isin, "IE00B4L5Y983");
    }

    #[tokio::test]
    async fn test_enrich_by_isins() {
        let sources: Vec<Arc<dyn DataSource>> = vec![
            Arc::new(FakeSource::with_records(
                Source::JustEtf,
                vec![record_with_3y("IE00B4L5Y983", Source::JustEtf, 8.0)],
            )),
            Arc::new(FakeSource::failing(Source::Investing)),
        ];

        let result = orchestrator(sources)
            .enrich_by_isins(&["IE00B4L5Y983".to_string(), "LU0323578657".to_string()], None)
            .await;

        // Only the ISIN JustETF knows about comes back; the failing source
        // and the unknown ISIN are skipped without error.
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].isin, "IE00B4L5Y983");
    }

    #[tokio::test]
    async fn test_progress_reaches_completion() {
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let cb: ProgressCallback = Arc::new(move |p, _| sink.lock().unwrap().push(p));

        let sources: Vec<Arc<dyn DataSource>> = vec![Arc::new(FakeSource::with_records(
            Source::JustEtf,
            vec![record_with_3y("IE00B4L5Y983", Source::JustEtf, 8.0)],
        ))];

        orchestrator(sources)
            .search(&SearchCriteria::default(), Some(cb))
            .await;

        let values = seen.lock().unwrap();
        assert_eq!(values.first().copied(), Some(0.0));
        assert_eq!(values.last().copied(), Some(1.0));
    }
}
