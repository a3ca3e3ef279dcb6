//! Data-quality scoring for aggregated instruments.

use crate::models::AggregatedInstrument;

/// Number of fields in the completeness checklist.
const CHECKLIST_LEN: usize = 9;

/// Weights for the data-quality score.
///
/// The score combines field completeness and source corroboration:
/// `min(100, completeness * completeness_weight + source_bonus)` where
/// `source_bonus = min(num_sources * bonus_per_source, bonus_cap)`.
/// The exact numbers are heuristic; more data and more sources always
/// increase the score monotonically.
#[derive(Debug, Clone)]
pub struct QualityWeights {
    pub completeness_weight: f64,
    pub bonus_per_source: f64,
    pub bonus_cap: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            completeness_weight: 70.0,
            bonus_per_source: 10.0,
            bonus_cap: 30.0,
        }
    }
}

impl QualityWeights {
    /// Score an aggregated instrument, 0-100.
    ///
    /// Completeness is measured over a fixed checklist of nine representative
    /// fields: the YTD/1y/3y/5y/10y returns, 3-year volatility, 3-year Sharpe
    /// ratio, the primary category, and the domicile.
    pub fn score(&self, instrument: &AggregatedInstrument, num_sources: usize) -> f64 {
        let perf = &instrument.performance;
        let checklist = [
            perf.ytd.is_some(),
            perf.return_1y.is_some(),
            perf.return_3y.is_some(),
            perf.return_5y.is_some(),
            perf.return_10y.is_some(),
            instrument.risk.volatility_3y.is_some(),
            instrument.risk.sharpe_ratio_3y.is_some(),
            instrument.category_morningstar.is_some(),
            instrument.domicile.is_some(),
        ];
        debug_assert_eq!(checklist.len(), CHECKLIST_LEN);

        let non_null = checklist.iter().filter(|present| **present).count();
        let completeness = non_null as f64 / CHECKLIST_LEN as f64;

        let source_bonus = (num_sources as f64 * self.bonus_per_source).min(self.bonus_cap);

        (completeness * self.completeness_weight + source_bonus).min(100.0)
    }
}
