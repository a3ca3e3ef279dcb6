//! Comparison pipelines.
//!
//! Two entry points: compare the universe against the best market ETF of a
//! category, or against an explicitly chosen benchmark ISIN. Both follow the
//! same linear pipeline: filter the universe, enrich it with market data,
//! settle on a benchmark, compute per-period deltas, aggregate statistics.
//!
//! Filtering never strands the caller with nothing: a category filter that
//! matches no instrument first falls back to the cross-taxonomy mapping and
//! finally to the whole universe. That degrade-to-everything step is policy,
//! not an accident — an over-strict filter must not produce an empty report.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};

use fundscope_market_data::progress::{report as report_progress, ProgressCallback};
use fundscope_market_data::{
    AggregatedInstrument, InstrumentKind, Period, SearchCriteria, Taxonomy,
};
use fundscope_market_data::source::InstrumentFetcher;

use crate::benchmark::BenchmarkResolver;
use crate::constants::{round_delta, REFERENCE_PERIOD};
use crate::taxonomies::{assogestioni_to_morningstar, morningstar_to_assogestioni};
use crate::universe::UniverseInstrument;

use super::report::{ComparisonEntry, ComparisonMode, ComparisonReport, Origin};

/// Weight of each horizon when scoring benchmark candidates. The 3- and
/// 5-year returns dominate: a benchmark without them is a poor yardstick.
const BENCHMARK_PERIOD_WEIGHTS: [(Period, f64); 10] = [
    (Period::OneMonth, 1.0),
    (Period::ThreeMonths, 1.0),
    (Period::SixMonths, 1.0),
    (Period::Ytd, 2.0),
    (Period::OneYear, 3.0),
    (Period::ThreeYears, 5.0),
    (Period::FiveYears, 5.0),
    (Period::SevenYears, 3.0),
    (Period::NineYears, 2.0),
    (Period::TenYears, 3.0),
];

/// Divisor applied to the quality score when it joins the benchmark score.
const BENCHMARK_QUALITY_DIVISOR: f64 = 10.0;

/// Compares the user's universe against market benchmarks.
pub struct ComparisonEngine {
    fetcher: Arc<dyn InstrumentFetcher>,
    resolver: BenchmarkResolver,
}

impl ComparisonEngine {
    pub fn new(fetcher: Arc<dyn InstrumentFetcher>, resolver: BenchmarkResolver) -> Self {
        Self { fetcher, resolver }
    }

    /// Compare universe funds against the best market ETF of a category.
    ///
    /// `periods` defaults to every horizon when empty.
    pub async fn compare_by_category(
        &self,
        universe: &[UniverseInstrument],
        category: &str,
        taxonomy: Taxonomy,
        periods: &[Period],
        progress: Option<ProgressCallback>,
    ) -> ComparisonReport {
        let periods = effective_periods(periods);
        let mut report = ComparisonReport::new(ComparisonMode::ByCategory, periods.clone());
        report.category = Some(category.to_string());
        report.taxonomy = Some(taxonomy);

        report_progress(progress.as_ref(), 0.0, "Starting comparison...");

        report_progress(progress.as_ref(), 0.1, "Filtering universe by category...");
        let filtered = self.filter_universe(universe, category, taxonomy);

        report_progress(progress.as_ref(), 0.2, "Fetching universe fund data...");
        let isins: Vec<String> = filtered.iter().map(|inst| inst.isin.clone()).collect();
        let enriched = self
            .fetcher
            .enrich_by_isins(&isins, stage_progress(progress.clone(), 0.2, 0.3, "Universe"))
            .await;

        report_progress(progress.as_ref(), 0.5, "Searching market ETFs...");
        let criteria = market_criteria(category, taxonomy);
        let market_etfs = self
            .fetcher
            .search(&criteria, stage_progress(progress.clone(), 0.5, 0.2, "Market"))
            .await;

        report_progress(progress.as_ref(), 0.7, "Selecting benchmark ETF...");
        let benchmark = select_benchmark(&market_etfs);
        report.benchmark = benchmark.clone();

        report_progress(progress.as_ref(), 0.8, "Computing performance deltas...");
        for instrument in enriched {
            let deltas = benchmark
                .as_ref()
                .map(|bench| calculate_deltas(&instrument, bench, &periods))
                .unwrap_or_default();
            report.results.push(ComparisonEntry {
                instrument,
                origin: Origin::Universe,
                benchmark_isin: benchmark.as_ref().map(|b| b.isin.clone()),
                deltas,
            });
        }

        // The benchmark itself joins the result set, never compared against
        // itself.
        if let Some(bench) = benchmark {
            report.results.push(ComparisonEntry {
                instrument: bench,
                origin: Origin::Market,
                benchmark_isin: None,
                deltas: BTreeMap::new(),
            });
        }

        report_progress(progress.as_ref(), 0.9, "Computing statistics...");
        report.calculate_statistics(REFERENCE_PERIOD);

        report_progress(
            progress.as_ref(),
            1.0,
            &format!("Comparison done: {} instruments", report.results.len()),
        );

        report
    }

    /// Compare universe funds against an explicitly chosen benchmark.
    ///
    /// The benchmark resolves through the three-tier resolver; when it cannot
    /// be resolved the report comes back with no benchmark and no results,
    /// and the caller decides how to message that.
    pub async fn compare_to_benchmark(
        &self,
        benchmark_isin: &str,
        universe: &[UniverseInstrument],
        filter_by_category: bool,
        periods: &[Period],
        progress: Option<ProgressCallback>,
    ) -> ComparisonReport {
        let periods = effective_periods(periods);
        let mut report = ComparisonReport::new(ComparisonMode::ByBenchmark, periods.clone());

        report_progress(progress.as_ref(), 0.0, "Starting benchmark comparison...");

        report_progress(progress.as_ref(), 0.1, "Resolving benchmark...");
        let Some(benchmark) = self.resolver.resolve(benchmark_isin, universe).await else {
            warn!("Benchmark {benchmark_isin} could not be resolved");
            return report;
        };

        let (category, taxonomy) = benchmark_category(&benchmark);
        report.category = category.clone();
        report.taxonomy = taxonomy;
        report.benchmark = Some(benchmark.clone());

        report_progress(progress.as_ref(), 0.3, "Filtering universe...");
        let filtered = match (&category, filter_by_category) {
            (Some(category), true) => {
                self.filter_universe(universe, category, taxonomy.unwrap_or(Taxonomy::Morningstar))
            }
            _ => universe.to_vec(),
        };

        report_progress(progress.as_ref(), 0.4, "Fetching universe fund data...");
        let isins: Vec<String> = filtered.iter().map(|inst| inst.isin.clone()).collect();
        let enriched = self
            .fetcher
            .enrich_by_isins(&isins, stage_progress(progress.clone(), 0.4, 0.4, "Universe"))
            .await;

        report_progress(progress.as_ref(), 0.8, "Computing performance deltas...");
        report.results.push(ComparisonEntry {
            instrument: benchmark.clone(),
            origin: Origin::Market,
            benchmark_isin: None,
            deltas: BTreeMap::new(),
        });
        for instrument in enriched {
            if instrument.isin == benchmark.isin {
                continue;
            }
            let deltas = calculate_deltas(&instrument, &benchmark, &periods);
            report.results.push(ComparisonEntry {
                instrument,
                origin: Origin::Universe,
                benchmark_isin: Some(benchmark.isin.clone()),
                deltas,
            });
        }

        report_progress(progress.as_ref(), 0.9, "Computing statistics...");
        report.calculate_statistics(REFERENCE_PERIOD);

        report_progress(
            progress.as_ref(),
            1.0,
            &format!("Comparison done: {} instruments", report.results.len()),
        );

        report
    }

    /// Find market ETFs whose name or ISIN contains `query`.
    pub async fn search_benchmarks_by_name(
        &self,
        query: &str,
        max_results: usize,
    ) -> Vec<AggregatedInstrument> {
        let criteria = SearchCriteria {
            instrument_kinds: vec![InstrumentKind::Etf],
            ..Default::default()
        };
        let all_etfs = self.fetcher.search(&criteria, None).await;

        let needle = query.to_lowercase();
        let mut matching: Vec<AggregatedInstrument> = all_etfs
            .into_iter()
            .filter(|etf| {
                etf.name.to_lowercase().contains(&needle)
                    || etf.isin.to_lowercase().contains(&needle)
            })
            .collect();
        matching.truncate(max_results);
        matching
    }

    /// Filter the universe by category with the documented fallbacks:
    /// direct match, cross-taxonomy mapping (primary taxonomy only), and
    /// finally the whole universe.
    fn filter_universe(
        &self,
        universe: &[UniverseInstrument],
        category: &str,
        taxonomy: Taxonomy,
    ) -> Vec<UniverseInstrument> {
        let needle = category.to_lowercase();

        let mut filtered: Vec<UniverseInstrument> = universe
            .iter()
            .filter(|inst| {
                inst.category()
                    .map(|cat| matches_category(&cat.to_lowercase(), &needle))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        if filtered.is_empty() && taxonomy == Taxonomy::Morningstar {
            let equivalents = morningstar_to_assogestioni(category);
            if !equivalents.is_empty() {
                filtered = universe
                    .iter()
                    .filter(|inst| {
                        inst.category().is_some_and(|cat| {
                            let cat = cat.to_lowercase();
                            equivalents
                                .iter()
                                .any(|asso| cat.contains(&asso.to_lowercase()))
                        })
                    })
                    .cloned()
                    .collect();
            }
        }

        if filtered.is_empty() {
            warn!("No universe fund matches category '{category}', using the whole universe");
            return universe.to_vec();
        }

        info!(
            "Category '{category}' matched {} of {} universe funds",
            filtered.len(),
            universe.len()
        );
        filtered
    }
}

/// Exact match, or substring containment in either direction.
fn matches_category(candidate: &str, needle: &str) -> bool {
    candidate == needle || candidate.contains(needle) || needle.contains(candidate)
}

fn effective_periods(periods: &[Period]) -> Vec<Period> {
    if periods.is_empty() {
        Period::ALL.to_vec()
    } else {
        periods.to_vec()
    }
}

/// Criteria for the market-side ETF search, mapping the category into the
/// primary taxonomy when it comes from the secondary one.
fn market_criteria(category: &str, taxonomy: Taxonomy) -> SearchCriteria {
    let mut criteria = SearchCriteria {
        instrument_kinds: vec![InstrumentKind::Etf],
        ..Default::default()
    };
    match taxonomy {
        Taxonomy::Morningstar => {
            criteria.categories_morningstar = vec![category.to_string()];
        }
        Taxonomy::Assogestioni => {
            criteria.categories_morningstar = assogestioni_to_morningstar(category);
            criteria.categories_assogestioni = vec![category.to_string()];
        }
    }
    criteria
}

/// The benchmark's own category, preferring the primary taxonomy.
fn benchmark_category(benchmark: &AggregatedInstrument) -> (Option<String>, Option<Taxonomy>) {
    if let Some(category) = &benchmark.category_morningstar {
        return (Some(category.clone()), Some(Taxonomy::Morningstar));
    }
    if let Some(category) = &benchmark.category_assogestioni {
        return (Some(category.clone()), Some(Taxonomy::Assogestioni));
    }
    (None, None)
}

/// Pick the candidate with the most usable data: weighted count of present
/// returns plus a fractional bonus from the quality score.
fn select_benchmark(candidates: &[AggregatedInstrument]) -> Option<AggregatedInstrument> {
    let mut best: Option<&AggregatedInstrument> = None;
    for candidate in candidates {
        // Strict comparison: on a tie, the earlier candidate stays.
        if best.is_none_or(|current| benchmark_score(candidate) > benchmark_score(current)) {
            best = Some(candidate);
        }
    }
    best.cloned()
}

fn benchmark_score(candidate: &AggregatedInstrument) -> f64 {
    let mut score = 0.0;
    for (period, weight) in BENCHMARK_PERIOD_WEIGHTS {
        if candidate.performance_for(period).is_some() {
            score += weight;
        }
    }
    score + candidate.data_quality_score / BENCHMARK_QUALITY_DIVISOR
}

/// Per-period deltas, present only where both sides have data.
fn calculate_deltas(
    instrument: &AggregatedInstrument,
    benchmark: &AggregatedInstrument,
    periods: &[Period],
) -> BTreeMap<Period, f64> {
    let mut deltas = BTreeMap::new();
    for period in periods {
        if let (Some(inst_perf), Some(bench_perf)) = (
            instrument.performance_for(*period),
            benchmark.performance_for(*period),
        ) {
            deltas.insert(*period, round_delta(inst_perf - bench_perf));
        }
    }
    deltas
}

/// Scale a pipeline stage's 0-1 progress into `[base, base + span]`.
fn stage_progress(
    outer: Option<ProgressCallback>,
    base: f64,
    span: f64,
    label: &'static str,
) -> Option<ProgressCallback> {
    outer.map(|cb| {
        let callback: ProgressCallback = Arc::new(move |p: f64, message: &str| {
            cb(base + p.clamp(0.0, 1.0) * span, &format!("[{label}] {message}"));
        });
        callback
    })
}
