//! Universe models - instruments loaded from the user's spreadsheet.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use fundscope_market_data::{
    AggregatedInstrument, InstrumentKind, PerformanceData, Period, RiskMetrics,
};

/// An instrument from the user's portfolio spreadsheet.
///
/// Performance values are in fractional representation (`0.0825` = +8.25%),
/// as exported by advisory platforms; scraped market data uses percent
/// representation instead. [`to_aggregated`](Self::to_aggregated) converts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseInstrument {
    pub isin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_morningstar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_sfdr: Option<String>,
    /// Fractional returns per horizon.
    #[serde(default)]
    pub performance: PerformanceData,
    /// Management + distribution fees, fractional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ter: Option<f64>,
    /// 3-month value at risk, fractional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var_3m: Option<f64>,
    /// Row in the originating spreadsheet, for traceability.
    pub source_row: usize,
}

impl UniverseInstrument {
    pub fn new(isin: impl Into<String>) -> Self {
        Self {
            isin: isin.into(),
            name: None,
            category_morningstar: None,
            category_sfdr: None,
            performance: PerformanceData::default(),
            ter: None,
            var_3m: None,
            source_row: 0,
        }
    }

    /// Fractional return for the given horizon, if present.
    pub fn performance_for(&self, period: Period) -> Option<f64> {
        self.performance.get(period)
    }

    /// Category used for filtering: primary taxonomy first, SFDR as backup.
    pub fn category(&self) -> Option<&str> {
        self.category_morningstar
            .as_deref()
            .or(self.category_sfdr.as_deref())
    }

    /// Convert into the aggregated (market) shape.
    ///
    /// Lossy by design: fractional returns are rescaled to percent, spreadsheet
    /// data is assumed complete (quality 100), and fields the spreadsheet does
    /// not carry stay empty.
    pub fn to_aggregated(&self) -> AggregatedInstrument {
        let mut performance = PerformanceData::default();
        for period in Period::ALL {
            performance.set(period, self.performance.get(period).map(|v| v * 100.0));
        }

        AggregatedInstrument {
            isin: self.isin.clone(),
            name: self.name.clone().unwrap_or_else(|| self.isin.clone()),
            kind: InstrumentKind::Fund,
            currency: "EUR".to_string(),
            domicile: None,
            distribution: Default::default(),
            category_morningstar: self.category_morningstar.clone(),
            category_assogestioni: None,
            ter: self.ter.map(|v| v * 100.0),
            aum: None,
            performance,
            risk: RiskMetrics::default(),
            sources: Vec::new(),
            data_quality_score: 100.0,
            last_updated: Utc::now(),
        }
    }
}

/// Outcome of loading the universe spreadsheet.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UniverseLoadResult {
    pub instruments: Vec<UniverseInstrument>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub total_rows: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
}

impl UniverseLoadResult {
    /// True when at least one instrument loaded and nothing failed hard.
    pub fn success(&self) -> bool {
        self.valid_count > 0 && self.errors.is_empty()
    }
}
