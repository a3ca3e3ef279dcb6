//! Single-period benchmark comparison.
//!
//! Compares every fund in the universe against one benchmark over one
//! horizon, producing per-fund deltas with a tri-state outcome and report
//! aggregates. A delta exists only when both sides have data for the
//! horizon; a missing side yields an indeterminate outcome, never a zero.

use log::info;
use serde::{Deserialize, Serialize};

use fundscope_market_data::Period;

use crate::constants::round_delta;
use crate::universe::UniverseInstrument;

/// One fund measured against the benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub instrument: UniverseInstrument,
    pub benchmark_performance: Option<f64>,
    pub fund_performance: Option<f64>,
    /// Fund minus benchmark, rounded; `None` when either side is missing.
    pub delta: Option<f64>,
    /// `Some(true)` beats, `Some(false)` does not, `None` indeterminate.
    pub beats_benchmark: Option<bool>,
}

impl BenchmarkComparison {
    /// Textual outcome for display and export.
    pub fn status(&self) -> &'static str {
        match self.beats_benchmark {
            Some(true) => "BEATS",
            Some(false) => "DOES NOT BEAT",
            None => "N/A",
        }
    }
}

/// Aggregate outcome of comparing a universe to one benchmark over one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub benchmark: UniverseInstrument,
    pub period: Period,
    pub results: Vec<BenchmarkComparison>,
}

impl BenchmarkReport {
    pub fn total_funds(&self) -> usize {
        self.results.len()
    }

    pub fn funds_beating(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.beats_benchmark == Some(true))
            .count()
    }

    pub fn funds_not_beating(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.beats_benchmark == Some(false))
            .count()
    }

    pub fn funds_without_data(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.beats_benchmark.is_none())
            .count()
    }

    /// Benchmark return over the report period.
    pub fn benchmark_performance(&self) -> Option<f64> {
        self.benchmark.performance_for(self.period)
    }

    /// Mean delta over funds that have one; `None` when no fund does.
    pub fn avg_delta(&self) -> Option<f64> {
        let deltas: Vec<f64> = self.results.iter().filter_map(|r| r.delta).collect();
        if deltas.is_empty() {
            return None;
        }
        Some(deltas.iter().sum::<f64>() / deltas.len() as f64)
    }

    /// Fund with the highest delta, if any delta exists.
    pub fn best_performer(&self) -> Option<&BenchmarkComparison> {
        self.results
            .iter()
            .filter(|r| r.delta.is_some())
            .max_by(|a, b| a.delta.partial_cmp(&b.delta).expect("deltas are finite"))
    }

    /// Fund with the lowest delta, if any delta exists.
    pub fn worst_performer(&self) -> Option<&BenchmarkComparison> {
        self.results
            .iter()
            .filter(|r| r.delta.is_some())
            .min_by(|a, b| a.delta.partial_cmp(&b.delta).expect("deltas are finite"))
    }

    /// Share of funds beating the benchmark, over funds with data.
    ///
    /// Exactly 0 when no fund has a determinate outcome.
    pub fn beat_percentage(&self) -> f64 {
        let with_data = self.funds_beating() + self.funds_not_beating();
        if with_data == 0 {
            return 0.0;
        }
        self.funds_beating() as f64 / with_data as f64 * 100.0
    }

    /// Results ordered by delta, best first unless `ascending`.
    ///
    /// The sort is stable and funds without a delta always trail, keeping
    /// their original relative order regardless of direction.
    pub fn sorted_results(&self, ascending: bool) -> Vec<&BenchmarkComparison> {
        let mut with_delta: Vec<&BenchmarkComparison> =
            self.results.iter().filter(|r| r.delta.is_some()).collect();
        let without_delta: Vec<&BenchmarkComparison> =
            self.results.iter().filter(|r| r.delta.is_none()).collect();

        with_delta.sort_by(|a, b| {
            let (a, b) = (a.delta.unwrap_or(0.0), b.delta.unwrap_or(0.0));
            if ascending {
                a.total_cmp(&b)
            } else {
                b.total_cmp(&a)
            }
        });

        with_delta.into_iter().chain(without_delta).collect()
    }
}

/// Compare every universe fund against the benchmark over one period.
///
/// A fund whose ISIN equals the benchmark's is excluded: an instrument is
/// never compared against itself.
pub fn compare_universe(
    universe: &[UniverseInstrument],
    benchmark: &UniverseInstrument,
    period: Period,
) -> BenchmarkReport {
    let benchmark_perf = benchmark.performance_for(period);
    let mut results = Vec::with_capacity(universe.len());

    for fund in universe {
        if fund.isin == benchmark.isin {
            continue;
        }

        let fund_perf = fund.performance_for(period);
        let (delta, beats) = match (fund_perf, benchmark_perf) {
            (Some(fund_value), Some(benchmark_value)) => {
                let delta = round_delta(fund_value - benchmark_value);
                (Some(delta), Some(delta > 0.0))
            }
            _ => (None, None),
        };

        results.push(BenchmarkComparison {
            instrument: fund.clone(),
            benchmark_performance: benchmark_perf,
            fund_performance: fund_perf,
            delta,
            beats_benchmark: beats,
        });
    }

    let report = BenchmarkReport {
        benchmark: benchmark.clone(),
        period,
        results,
    };

    info!(
        "Comparison done: {} beat the benchmark, {} do not, {} without data",
        report.funds_beating(),
        report.funds_not_beating(),
        report.funds_without_data()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fund(isin: &str, return_3y: Option<f64>) -> UniverseInstrument {
        let mut inst = UniverseInstrument::new(isin);
        inst.performance.return_3y = return_3y;
        inst
    }

    fn three_fund_universe() -> (Vec<UniverseInstrument>, UniverseInstrument) {
        let universe = vec![
            fund("LU0000000017", Some(12.0)),
            fund("LU0000000025", Some(8.0)),
            fund("LU0000000033", None),
        ];
        let benchmark = fund("IE00B4L5Y983", Some(10.0));
        (universe, benchmark)
    }

    #[test]
    fn test_end_to_end_scenario() {
        let (universe, benchmark) = three_fund_universe();
        let report = compare_universe(&universe, &benchmark, Period::ThreeYears);

        assert_eq!(report.total_funds(), 3);
        assert_eq!(report.results[0].delta, Some(2.0));
        assert_eq!(report.results[1].delta, Some(-2.0));
        assert_eq!(report.results[2].delta, None);

        assert_eq!(report.funds_beating(), 1);
        assert_eq!(report.funds_not_beating(), 1);
        assert_eq!(report.funds_without_data(), 1);
        assert_eq!(report.avg_delta(), Some(0.0));
    }

    #[test]
    fn test_missing_data_never_becomes_zero() {
        let universe = vec![fund("LU0000000017", None)];
        let benchmark = fund("IE00B4L5Y983", Some(8.5));
        let report = compare_universe(&universe, &benchmark, Period::ThreeYears);

        let result = &report.results[0];
        assert_eq!(result.delta, None);
        assert_eq!(result.beats_benchmark, None);
        assert_eq!(result.status(), "N/A");
        // Indeterminate results are excluded from the average.
        assert_eq!(report.avg_delta(), None);
    }

    #[test]
    fn test_benchmark_excluded_from_candidates() {
        let (mut universe, benchmark) = three_fund_universe();
        universe.push(benchmark.clone());

        let report = compare_universe(&universe, &benchmark, Period::ThreeYears);
        assert_eq!(report.total_funds(), 3);
        assert!(report
            .results
            .iter()
            .all(|r| r.instrument.isin != benchmark.isin));
    }

    #[test]
    fn test_beat_percentage_zero_without_data() {
        let universe = vec![fund("LU0000000017", None)];
        let benchmark = fund("IE00B4L5Y983", None);
        let report = compare_universe(&universe, &benchmark, Period::ThreeYears);

        assert_eq!(report.beat_percentage(), 0.0);
    }

    #[test]
    fn test_beat_percentage_over_funds_with_data() {
        let (universe, benchmark) = three_fund_universe();
        let report = compare_universe(&universe, &benchmark, Period::ThreeYears);

        // 1 of 2 determinate outcomes.
        assert_eq!(report.beat_percentage(), 50.0);
    }

    #[test]
    fn test_best_and_worst_performer() {
        let (universe, benchmark) = three_fund_universe();
        let report = compare_universe(&universe, &benchmark, Period::ThreeYears);

        assert_eq!(report.best_performer().unwrap().instrument.isin, "LU0000000017");
        assert_eq!(report.worst_performer().unwrap().instrument.isin, "LU0000000025");
    }

    #[test]
    fn test_sorting_contract() {
        let universe = vec![
            fund("LU0000000017", Some(8.0)),
            fund("LU0000000025", None),
            fund("LU0000000033", Some(12.0)),
            fund("LU0000000041", None),
        ];
        let benchmark = fund("IE00B4L5Y983", Some(10.0));
        let report = compare_universe(&universe, &benchmark, Period::ThreeYears);

        let descending: Vec<&str> = report
            .sorted_results(false)
            .iter()
            .map(|r| r.instrument.isin.as_str())
            .collect();
        // Non-null deltas first (best to worst), then the null-delta funds
        // in their original order.
        assert_eq!(
            descending,
            vec!["LU0000000033", "LU0000000017", "LU0000000025", "LU0000000041"]
        );

        let ascending: Vec<&str> = report
            .sorted_results(true)
            .iter()
            .map(|r| r.instrument.isin.as_str())
            .collect();
        // Direction flips the delta segment only; nulls still trail.
        assert_eq!(
            ascending,
            vec!["LU0000000017", "LU0000000033", "LU0000000025", "LU0000000041"]
        );
    }

    #[test]
    fn test_sorting_idempotent() {
        let (universe, benchmark) = three_fund_universe();
        let report = compare_universe(&universe, &benchmark, Period::ThreeYears);

        let once: Vec<&str> = report
            .sorted_results(false)
            .iter()
            .map(|r| r.instrument.isin.as_str())
            .collect();

        let resorted = BenchmarkReport {
            benchmark: report.benchmark.clone(),
            period: report.period,
            results: report.sorted_results(false).into_iter().cloned().collect(),
        };
        let twice: Vec<&str> = resorted
            .sorted_results(false)
            .iter()
            .map(|r| r.instrument.isin.as_str())
            .collect();

        assert_eq!(once, twice);
    }
}
