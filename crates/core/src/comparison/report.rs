//! Multi-period comparison results and aggregate statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fundscope_market_data::{AggregatedInstrument, Period, Taxonomy};

/// Where a result row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The user's portfolio.
    Universe,
    /// Scraped market data (the benchmark row).
    Market,
}

/// Which pipeline produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Universe funds against the best market ETF of a category.
    ByCategory,
    /// Universe funds against an explicitly chosen benchmark.
    ByBenchmark,
}

/// One instrument paired with its per-period deltas against the benchmark.
///
/// A period absent from `deltas` means the delta could not be computed for
/// it (either side missing data) — deltas are never defaulted to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub instrument: AggregatedInstrument,
    pub origin: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_isin: Option<String>,
    #[serde(default)]
    pub deltas: BTreeMap<Period, f64>,
}

impl ComparisonEntry {
    /// Delta for the given horizon, if computable.
    pub fn delta_for(&self, period: Period) -> Option<f64> {
        self.deltas.get(&period).copied()
    }

    /// Tri-state outcome at the given horizon.
    pub fn is_outperformer(&self, period: Period) -> Option<bool> {
        self.delta_for(period).map(|delta| delta > 0.0)
    }
}

/// Aggregates over a report's results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonStatistics {
    pub total_instruments: usize,
    pub universe_count: usize,
    pub market_count: usize,
    pub outperformers_count: usize,
    pub underperformers_count: usize,
    /// Mean delta per period, over universe entries that have one.
    pub avg_delta: BTreeMap<Period, f64>,
    pub best_performer: Option<ComparisonEntry>,
    pub worst_performer: Option<ComparisonEntry>,
}

/// Complete outcome of one comparison invocation. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub mode: ComparisonMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<Taxonomy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<AggregatedInstrument>,
    pub periods: Vec<Period>,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<ComparisonEntry>,
    #[serde(default)]
    pub statistics: ComparisonStatistics,
}

impl ComparisonReport {
    pub fn new(mode: ComparisonMode, periods: Vec<Period>) -> Self {
        Self {
            mode,
            category: None,
            taxonomy: None,
            benchmark: None,
            periods,
            generated_at: Utc::now(),
            results: Vec::new(),
            statistics: ComparisonStatistics::default(),
        }
    }

    /// Compute aggregate statistics at the given reference horizon.
    ///
    /// Only universe-origin entries count toward outperformance and the
    /// averages; the benchmark's own market row is descriptive.
    pub fn calculate_statistics(&mut self, reference_period: Period) {
        if self.results.is_empty() {
            return;
        }

        let mut stats = ComparisonStatistics {
            total_instruments: self.results.len(),
            ..Default::default()
        };

        let universe: Vec<&ComparisonEntry> = self
            .results
            .iter()
            .filter(|r| r.origin == Origin::Universe)
            .collect();
        stats.universe_count = universe.len();
        stats.market_count = stats.total_instruments - stats.universe_count;

        stats.outperformers_count = universe
            .iter()
            .filter(|r| r.is_outperformer(reference_period) == Some(true))
            .count();
        stats.underperformers_count = universe
            .iter()
            .filter(|r| r.is_outperformer(reference_period) == Some(false))
            .count();

        for period in Period::ALL {
            let deltas: Vec<f64> = universe.iter().filter_map(|r| r.delta_for(period)).collect();
            if !deltas.is_empty() {
                stats
                    .avg_delta
                    .insert(period, deltas.iter().sum::<f64>() / deltas.len() as f64);
            }
        }

        let mut ranked: Vec<&ComparisonEntry> = universe
            .iter()
            .copied()
            .filter(|r| r.delta_for(reference_period).is_some())
            .collect();
        ranked.sort_by(|a, b| {
            let (a, b) = (
                a.delta_for(reference_period).unwrap_or(0.0),
                b.delta_for(reference_period).unwrap_or(0.0),
            );
            b.total_cmp(&a)
        });
        stats.best_performer = ranked.first().map(|r| (*r).clone());
        stats.worst_performer = ranked.last().map(|r| (*r).clone());

        self.statistics = stats;
    }

    /// Results ordered by delta at `period`, best first unless `ascending`;
    /// entries without a delta always trail in their original order.
    pub fn sorted_results(&self, period: Period, ascending: bool) -> Vec<&ComparisonEntry> {
        let mut with_delta: Vec<&ComparisonEntry> = self
            .results
            .iter()
            .filter(|r| r.delta_for(period).is_some())
            .collect();
        let without_delta: Vec<&ComparisonEntry> = self
            .results
            .iter()
            .filter(|r| r.delta_for(period).is_none())
            .collect();

        with_delta.sort_by(|a, b| {
            let (a, b) = (
                a.delta_for(period).unwrap_or(0.0),
                b.delta_for(period).unwrap_or(0.0),
            );
            if ascending {
                a.total_cmp(&b)
            } else {
                b.total_cmp(&a)
            }
        });

        with_delta.into_iter().chain(without_delta).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundscope_market_data::{PerformanceData, RiskMetrics};

    fn instrument(isin: &str) -> AggregatedInstrument {
        AggregatedInstrument {
            isin: isin.to_string(),
            name: isin.to_string(),
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

    fn entry(isin: &str, origin: Origin, delta_3y: Option<f64>) -> ComparisonEntry {
        let mut deltas = BTreeMap::new();
        if let Some(delta) = delta_3y {
            deltas.insert(Period::ThreeYears, delta);
        }
        ComparisonEntry {
            instrument: instrument(isin),
            origin,
            benchmark_isin: Some("IE00B4L5Y983".to_string()),
            deltas,
        }
    }

    fn report_with(entries: Vec<ComparisonEntry>) -> ComparisonReport {
        let mut report = ComparisonReport::new(
            ComparisonMode::ByBenchmark,
            vec![Period::ThreeYears],
        );
        report.results = entries;
        report
    }

    #[test]
    fn test_statistics_counts_universe_only() {
        let mut report = report_with(vec![
            entry("LU0000000017", Origin::Universe, Some(2.0)),
            entry("LU0000000025", Origin::Universe, Some(-2.0)),
            entry("LU0000000033", Origin::Universe, None),
            entry("IE00B4L5Y983", Origin::Market, None),
        ]);
        report.calculate_statistics(Period::ThreeYears);

        let stats = &report.statistics;
        assert_eq!(stats.total_instruments, 4);
        assert_eq!(stats.universe_count, 3);
        assert_eq!(stats.market_count, 1);
        assert_eq!(stats.outperformers_count, 1);
        assert_eq!(stats.underperformers_count, 1);
        assert_eq!(stats.avg_delta.get(&Period::ThreeYears), Some(&0.0));
        assert_eq!(
            stats.best_performer.as_ref().unwrap().instrument.isin,
            "LU0000000017"
        );
        assert_eq!(
            stats.worst_performer.as_ref().unwrap().instrument.isin,
            "LU0000000025"
        );
    }

    #[test]
    fn test_statistics_on_empty_results() {
        let mut report = report_with(Vec::new());
        report.calculate_statistics(Period::ThreeYears);

        assert_eq!(report.statistics.total_instruments, 0);
        assert!(report.statistics.avg_delta.is_empty());
        assert!(report.statistics.best_performer.is_none());
    }

    #[test]
    fn test_avg_delta_skips_missing() {
        let mut report = report_with(vec![
            entry("LU0000000017", Origin::Universe, Some(3.0)),
            entry("LU0000000025", Origin::Universe, None),
        ]);
        report.calculate_statistics(Period::ThreeYears);

        assert_eq!(
            report.statistics.avg_delta.get(&Period::ThreeYears),
            Some(&3.0)
        );
        // No data at all for other horizons.
        assert!(!report.statistics.avg_delta.contains_key(&Period::OneYear));
    }

    #[test]
    fn test_entry_serialization_round_trip() {
        let entry = entry("LU0000000017", Origin::Universe, Some(2.5));

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"universe\""));

        let back: ComparisonEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.delta_for(Period::ThreeYears), Some(2.5));
        assert_eq!(back.origin, Origin::Universe);
    }

    #[test]
    fn test_sorted_results_nulls_trail_both_directions() {
        let report = report_with(vec![
            entry("A0000000001", Origin::Universe, None),
            entry("B0000000002", Origin::Universe, Some(1.0)),
            entry("C0000000003", Origin::Universe, Some(5.0)),
        ]);

        let descending: Vec<&str> = report
            .sorted_results(Period::ThreeYears, false)
            .iter()
            .map(|r| r.instrument.isin.as_str())
            .collect();
        assert_eq!(descending, vec!["C0000000003", "B0000000002", "A0000000001"]);

        let ascending: Vec<&str> = report
            .sorted_results(Period::ThreeYears, true)
            .iter()
            .map(|r| r.instrument.isin.as_str())
            .collect();
        assert_eq!(ascending, vec!["B0000000002", "C0000000003", "A0000000001"]);
    }
}
