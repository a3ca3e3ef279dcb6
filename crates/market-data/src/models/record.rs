//! Raw source records.
//!
//! A [`SourceRecord`] is one observation of an instrument from one source,
//! exactly as the platform reported it. Records are immutable and consumed
//! once by the merger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{DistributionPolicy, InstrumentKind, Period, Source};

/// Returns over the supported horizons, in percent (e.g. `8.25` = +8.25%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_1m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_3m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_6m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ytd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_1y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_3y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_5y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_7y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_9y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_10y: Option<f64>,
}

impl PerformanceData {
    /// Return for the given horizon, if present.
    pub fn get(&self, period: Period) -> Option<f64> {
        match period {
            Period::OneMonth => self.return_1m,
            Period::ThreeMonths => self.return_3m,
            Period::SixMonths => self.return_6m,
            Period::Ytd => self.ytd,
            Period::OneYear => self.return_1y,
            Period::ThreeYears => self.return_3y,
            Period::FiveYears => self.return_5y,
            Period::SevenYears => self.return_7y,
            Period::NineYears => self.return_9y,
            Period::TenYears => self.return_10y,
        }
    }

    /// Set the return for the given horizon.
    pub fn set(&mut self, period: Period, value: Option<f64>) {
        match period {
            Period::OneMonth => self.return_1m = value,
            Period::ThreeMonths => self.return_3m = value,
            Period::SixMonths => self.return_6m = value,
            Period::Ytd => self.ytd = value,
            Period::OneYear => self.return_1y = value,
            Period::ThreeYears => self.return_3y = value,
            Period::FiveYears => self.return_5y = value,
            Period::SevenYears => self.return_7y = value,
            Period::NineYears => self.return_9y = value,
            Period::TenYears => self.return_10y = value,
        }
    }
}

/// Risk metrics as reported by a source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_1y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_3y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_5y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio_3y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_drawdown: Option<f64>,
}

/// One observation of an instrument from one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub isin: String,
    pub name: String,
    pub source: Source,
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
    /// Total expense ratio, in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ter: Option<f64>,
    /// Assets under management, in millions of the record currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aum: Option<f64>,
    #[serde(default)]
    pub performance: PerformanceData,
    #[serde(default)]
    pub risk: RiskMetrics,
    pub retrieved_at: DateTime<Utc>,
}

impl SourceRecord {
    /// Create a record with the mandatory fields; everything else defaults.
    pub fn new(isin: impl Into<String>, name: impl Into<String>, source: Source) -> Self {
        Self {
            isin: isin.into(),
            name: name.into(),
            source,
            kind: InstrumentKind::Unknown,
            currency: "EUR".to_string(),
            domicile: None,
            distribution: DistributionPolicy::Unknown,
            category_morningstar: None,
            category_assogestioni: None,
            ter: None,
            aum: None,
            performance: PerformanceData::default(),
            risk: RiskMetrics::default(),
            retrieved_at: Utc::now(),
        }
    }
}
