//! Search criteria.

use serde::{Deserialize, Serialize};

use super::types::{DistributionPolicy, InstrumentKind, Period};

/// Filter specification for a multi-source search.
///
/// Pure value object; carries no behavior beyond serialization and the
/// convenience predicates used by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub categories_morningstar: Vec<String>,
    #[serde(default)]
    pub categories_assogestioni: Vec<String>,
    pub currencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_filter: Option<DistributionPolicy>,
    /// Minimum return (percent) over `performance_period`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_performance: Option<f64>,
    pub performance_period: Period,
    pub instrument_kinds: Vec<InstrumentKind>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            categories_morningstar: Vec::new(),
            categories_assogestioni: Vec::new(),
            currencies: vec!["EUR".to_string()],
            distribution_filter: None,
            min_performance: None,
            performance_period: Period::ThreeYears,
            instrument_kinds: vec![InstrumentKind::Etf, InstrumentKind::Fund],
        }
    }
}

impl SearchCriteria {
    /// Whether any category filter is set, in either taxonomy.
    pub fn has_category_filter(&self) -> bool {
        !self.categories_morningstar.is_empty() || !self.categories_assogestioni.is_empty()
    }
}
