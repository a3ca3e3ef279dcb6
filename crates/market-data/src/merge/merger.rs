//! Multi-source record merging.
//!
//! Groups raw records by normalized ISIN, resolves field conflicts by source
//! priority, and scores the result. One aggregated instrument comes out per
//! unique valid ISIN; malformed records are logged and skipped, never fatal.

use std::collections::HashMap;

use chrono::Utc;
use log::{info, warn};

use super::quality::QualityWeights;
use crate::models::{
    isin, AggregatedInstrument, DistributionPolicy, InstrumentKind, PerformanceData, Period,
    RiskMetrics, Source, SourceRecord,
};

/// Rank assigned to sources missing from the priority list; they sort after
/// every ranked source.
const UNRANKED: usize = usize::MAX;

/// Aggregates and deduplicates records from multiple sources, keyed by ISIN.
///
/// Conflicts are resolved per field: sources earlier in the priority list
/// win, but a higher-priority source's missing value never suppresses a
/// lower-priority source's present one.
#[derive(Debug, Default)]
pub struct RecordMerger {
    weights: QualityWeights,
}

impl RecordMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a merger with custom quality-score weights.
    pub fn with_weights(weights: QualityWeights) -> Self {
        Self { weights }
    }

    /// Merge raw records into one aggregated instrument per ISIN.
    ///
    /// Records with an invalid ISIN are skipped with a warning. Group and
    /// in-group ordering follow first encounter in `records`, so the output
    /// order is deterministic.
    pub fn merge(
        &self,
        records: Vec<SourceRecord>,
        source_priority: &[Source],
    ) -> Vec<AggregatedInstrument> {
        if records.is_empty() {
            return Vec::new();
        }
        let total = records.len();

        // Group by normalized ISIN, preserving encounter order of groups
        // and of members within each group.
        let mut group_index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<SourceRecord>)> = Vec::new();

        for record in records {
            let normalized = isin::normalize(&record.isin);
            if !isin::is_valid(&normalized) {
                warn!("Invalid ISIN skipped: {}", record.isin);
                continue;
            }
            match group_index.get(&normalized) {
                Some(&idx) => groups[idx].1.push(record),
                None => {
                    group_index.insert(normalized.clone(), groups.len());
                    groups.push((normalized, vec![record]));
                }
            }
        }

        let rank = rank_map(source_priority);

        let mut aggregated = Vec::with_capacity(groups.len());
        for (code, group) in groups {
            match self.merge_group(&code, group, &rank) {
                Some(merged) => aggregated.push(merged),
                None => warn!("Failed to merge group for {code}, skipping"),
            }
        }

        info!(
            "Merged {} records into {} unique instruments",
            total,
            aggregated.len()
        );

        aggregated
    }

    /// Merge the records sharing one ISIN. `None` only for an empty group.
    fn merge_group(
        &self,
        code: &str,
        mut group: Vec<SourceRecord>,
        rank: &HashMap<Source, usize>,
    ) -> Option<AggregatedInstrument> {
        // Stable sort: same-source records keep their relative order.
        group.sort_by_key(|r| rank.get(&r.source).copied().unwrap_or(UNRANKED));

        let primary = group.first()?;

        let mut performance = PerformanceData::default();
        for period in Period::ALL {
            performance.set(period, first_value(&group, |r| r.performance.get(period)));
        }

        let risk = RiskMetrics {
            volatility_1y: first_value(&group, |r| r.risk.volatility_1y),
            volatility_3y: first_value(&group, |r| r.risk.volatility_3y),
            volatility_5y: first_value(&group, |r| r.risk.volatility_5y),
            sharpe_ratio_3y: first_value(&group, |r| r.risk.sharpe_ratio_3y),
            max_drawdown: first_value(&group, |r| r.risk.max_drawdown),
        };

        let mut merged = AggregatedInstrument {
            isin: code.to_string(),
            name: primary.name.clone(),
            kind: first_kind(&group),
            currency: primary.currency.clone(),
            domicile: first_text(&group, |r| r.domicile.as_deref()),
            distribution: first_distribution(&group),
            category_morningstar: first_text(&group, |r| r.category_morningstar.as_deref()),
            category_assogestioni: first_text(&group, |r| r.category_assogestioni.as_deref()),
            ter: first_value(&group, |r| r.ter),
            aum: first_value(&group, |r| r.aum),
            performance,
            risk,
            sources: distinct_sources(&group),
            data_quality_score: 0.0,
            last_updated: Utc::now(),
        };

        let num_sources = merged.sources.len();
        merged.data_quality_score = self.weights.score(&merged, num_sources);

        Some(merged)
    }
}

/// Map each source to its index in the priority list.
fn rank_map(priority: &[Source]) -> HashMap<Source, usize> {
    priority
        .iter()
        .enumerate()
        .map(|(idx, source)| (*source, idx))
        .collect()
}

/// First present value scanning the group in priority order.
fn first_value<F>(group: &[SourceRecord], get: F) -> Option<f64>
where
    F: Fn(&SourceRecord) -> Option<f64>,
{
    group.iter().find_map(get)
}

/// First non-empty string scanning the group in priority order.
fn first_text<'a, F>(group: &'a [SourceRecord], get: F) -> Option<String>
where
    F: Fn(&'a SourceRecord) -> Option<&'a str>,
{
    group
        .iter()
        .filter_map(|r| get(r))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First non-Unknown distribution policy; an explicit Unknown does not block
/// a later more specific value.
fn first_distribution(group: &[SourceRecord]) -> DistributionPolicy {
    group
        .iter()
        .map(|r| r.distribution)
        .find(|d| *d != DistributionPolicy::Unknown)
        .unwrap_or(DistributionPolicy::Unknown)
}

/// First non-Unknown instrument kind, same rule as distribution.
fn first_kind(group: &[SourceRecord]) -> InstrumentKind {
    group
        .iter()
        .map(|r| r.kind)
        .find(|k| *k != InstrumentKind::Unknown)
        .unwrap_or(InstrumentKind::Unknown)
}

/// Distinct source tags, order of first appearance in the group.
fn distinct_sources(group: &[SourceRecord]) -> Vec<Source> {
    let mut seen = Vec::new();
    for record in group {
        if !seen.contains(&record.source) {
            seen.push(record.source);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIORITY: [Source; 3] = [Source::Morningstar, Source::JustEtf, Source::Investing];

    fn record(isin: &str, name: &str, source: Source) -> SourceRecord {
        SourceRecord::new(isin, name, source)
    }

    #[test]
    fn test_merge_empty_list() {
        let merger = RecordMerger::new();
        assert!(merger.merge(Vec::new(), &PRIORITY).is_empty());
    }

    #[test]
    fn test_merge_single_record_preserves_fields() {
        let merger = RecordMerger::new();
        let mut input = record("IE00B4L5Y983", "iShares Core MSCI World", Source::JustEtf);
        input.kind = InstrumentKind::Etf;
        input.currency = "USD".to_string();
        input.domicile = Some("IE".to_string());
        input.performance.return_3y = Some(8.0);
        input.risk.sharpe_ratio_3y = Some(0.9);

        let result = merger.merge(vec![input], &PRIORITY);
        assert_eq!(result.len(), 1);

        let merged = &result[0];
        assert_eq!(merged.isin, "IE00B4L5Y983");
        assert_eq!(merged.name, "iShares Core MSCI World");
        assert_eq!(merged.kind, InstrumentKind::Etf);
        assert_eq!(merged.currency, "USD");
        assert_eq!(merged.domicile.as_deref(), Some("IE"));
        assert_eq!(merged.performance.return_3y, Some(8.0));
        assert_eq!(merged.risk.sharpe_ratio_3y, Some(0.9));
        assert_eq!(merged.sources, vec![Source::JustEtf]);
    }

    #[test]
    fn test_merge_groups_by_isin() {
        let merger = RecordMerger::new();
        let records = vec![
            record("IE00B4L5Y983", "World A", Source::JustEtf),
            record("LU0323578657", "Flossbach", Source::Morningstar),
            record("IE00B4L5Y983", "World B", Source::Morningstar),
        ];

        let result = merger.merge(records, &PRIORITY);
        assert_eq!(result.len(), 2);

        let world = result.iter().find(|i| i.isin == "IE00B4L5Y983").unwrap();
        assert_eq!(world.sources.len(), 2);
        assert!(world.sources.contains(&Source::JustEtf));
        assert!(world.sources.contains(&Source::Morningstar));
    }

    #[test]
    fn test_primary_source_wins_name_and_currency() {
        let merger = RecordMerger::new();
        let mut from_justetf = record("IE00B4L5Y983", "Name from JustETF", Source::JustEtf);
        from_justetf.currency = "USD".to_string();
        let from_morningstar = record("IE00B4L5Y983", "Name from Morningstar", Source::Morningstar);

        let result = merger.merge(vec![from_justetf, from_morningstar], &PRIORITY);
        assert_eq!(result.len(), 1);
        // Morningstar ranks first in the priority list.
        assert_eq!(result[0].name, "Name from Morningstar");
        assert_eq!(result[0].currency, "EUR");
    }

    #[test]
    fn test_null_coalescing_across_priorities() {
        // A higher-priority null must not suppress a lower-priority value.
        let merger = RecordMerger::new();

        let mut low = record("IE00B4L5Y983", "World", Source::JustEtf);
        low.performance.return_1y = None;
        low.performance.return_3y = Some(10.0);

        let mut high = record("IE00B4L5Y983", "World", Source::Morningstar);
        high.performance.return_1y = Some(15.0);
        high.performance.return_3y = None;

        let result = merger.merge(vec![low, high], &PRIORITY);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].performance.return_1y, Some(15.0));
        assert_eq!(result[0].performance.return_3y, Some(10.0));
    }

    #[test]
    fn test_unknown_enum_does_not_block_specific_value() {
        let merger = RecordMerger::new();

        let mut high = record("IE00B4L5Y983", "World", Source::Morningstar);
        high.distribution = DistributionPolicy::Unknown;
        high.kind = InstrumentKind::Unknown;

        let mut low = record("IE00B4L5Y983", "World", Source::Investing);
        low.distribution = DistributionPolicy::Accumulating;
        low.kind = InstrumentKind::Etf;

        let result = merger.merge(vec![high, low], &PRIORITY);
        assert_eq!(result[0].distribution, DistributionPolicy::Accumulating);
        assert_eq!(result[0].kind, InstrumentKind::Etf);
    }

    #[test]
    fn test_invalid_isin_skipped_silently() {
        let merger = RecordMerger::new();
        let records = vec![
            record("INVALID", "Bad", Source::JustEtf),
            record("IE00B4L5Y983", "Good", Source::JustEtf),
        ];

        let result = merger.merge(records, &PRIORITY);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].isin, "IE00B4L5Y983");
    }

    #[test]
    fn test_isin_normalized_before_grouping() {
        let merger = RecordMerger::new();
        let records = vec![
            record(" ie00b4l5y983 ", "Lower", Source::JustEtf),
            record("IE00B4L5Y983", "Upper", Source::Morningstar),
        ];

        let result = merger.merge(records, &PRIORITY);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].isin, "IE00B4L5Y983");
        assert_eq!(result[0].sources.len(), 2);
    }

    #[test]
    fn test_unranked_source_sorts_last() {
        let merger = RecordMerger::new();
        let priority = [Source::Morningstar];

        let unranked = record("IE00B4L5Y983", "From Investing", Source::Investing);
        let ranked = record("IE00B4L5Y983", "From Morningstar", Source::Morningstar);

        let result = merger.merge(vec![unranked, ranked], &priority);
        assert_eq!(result[0].name, "From Morningstar");
    }

    #[test]
    fn test_sources_order_of_first_appearance() {
        let merger = RecordMerger::new();
        let records = vec![
            record("IE00B4L5Y983", "A", Source::Investing),
            record("IE00B4L5Y983", "B", Source::JustEtf),
            record("IE00B4L5Y983", "C", Source::Investing),
        ];

        let result = merger.merge(records, &PRIORITY);
        assert_eq!(result[0].sources, vec![Source::Investing, Source::JustEtf]);
    }

    #[test]
    fn test_quality_score_reflects_completeness_and_sources() {
        let merger = RecordMerger::new();

        let mut rich = record("IE00B4L5Y983", "Rich", Source::JustEtf);
        rich.performance.ytd = Some(5.0);
        rich.performance.return_1y = Some(10.0);
        rich.performance.return_3y = Some(8.0);
        rich.performance.return_5y = Some(12.0);
        rich.performance.return_10y = Some(15.0);
        rich.risk.volatility_3y = Some(14.0);
        rich.risk.sharpe_ratio_3y = Some(0.8);
        rich.category_morningstar = Some("Azionari Globali".to_string());
        let corroborating = record("IE00B4L5Y983", "Rich", Source::Morningstar);

        let sparse = record("LU0323578657", "Sparse", Source::JustEtf);

        let result = merger.merge(vec![rich, corroborating, sparse], &PRIORITY);
        let rich_score = result
            .iter()
            .find(|i| i.isin == "IE00B4L5Y983")
            .unwrap()
            .data_quality_score;
        let sparse_score = result
            .iter()
            .find(|i| i.isin == "LU0323578657")
            .unwrap()
            .data_quality_score;

        assert!(rich_score > sparse_score);
        assert!(rich_score <= 100.0);
    }
}
