//! Aggregated instruments — the merge output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{PerformanceData, RiskMetrics};
use super::types::{DistributionPolicy, InstrumentKind, Period, Source, Taxonomy};

/// One instrument consolidated from one or more source records.
///
/// Exactly one aggregated instrument exists per ISIN in the output of a
/// single merge call. Read-only after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedInstrument {
    pub isin: String,
    pub name: String,
    #[serde(default)]
    pub kind: InstrumentKind,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domicile: Option<String>,
    #[serde(default)]
    pub distribution: DistributionPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_morningstar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_assogestioni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aum: Option<f64>,
    /// Returns in percent.
    #[serde(default)]
    pub performance: PerformanceData,
    #[serde(default)]
    pub risk: RiskMetrics,
    /// Contributing sources, order of first appearance.
    pub sources: Vec<Source>,
    /// Heuristic 0-100 score combining field completeness and source count.
    pub data_quality_score: f64,
    pub last_updated: DateTime<Utc>,
}

impl AggregatedInstrument {
    /// Return for the given horizon, if present.
    pub fn performance_for(&self, period: Period) -> Option<f64> {
        self.performance.get(period)
    }

    /// Category under the given taxonomy, if present.
    pub fn category(&self, taxonomy: Taxonomy) -> Option<&str> {
        match taxonomy {
            Taxonomy::Morningstar => self.category_morningstar.as_deref(),
            Taxonomy::Assogestioni => self.category_assogestioni.as_deref(),
        }
    }
}
