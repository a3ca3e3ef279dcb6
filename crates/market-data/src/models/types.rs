//! Shared enums for sources, horizons, and instrument classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A data source contributing raw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    JustEtf,
    Morningstar,
    Investing,
}

impl Source {
    /// Stable identifier used in logs and rate-limiter keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JustEtf => "justetf",
            Self::Morningstar => "morningstar",
            Self::Investing => "investing",
        }
    }

    /// All known sources.
    pub const ALL: [Source; 3] = [Self::JustEtf, Self::Morningstar, Self::Investing];
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "justetf" => Ok(Self::JustEtf),
            "morningstar" => Ok(Self::Morningstar),
            "investing" => Ok(Self::Investing),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

/// Performance horizon.
///
/// The fixed set of time windows over which returns are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    Ytd,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "7y")]
    SevenYears,
    #[serde(rename = "9y")]
    NineYears,
    #[serde(rename = "10y")]
    TenYears,
}

impl Period {
    /// All horizons, shortest first.
    pub const ALL: [Period; 10] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::Ytd,
        Self::OneYear,
        Self::ThreeYears,
        Self::FiveYears,
        Self::SevenYears,
        Self::NineYears,
        Self::TenYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMonth => "1m",
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::Ytd => "ytd",
            Self::OneYear => "1y",
            Self::ThreeYears => "3y",
            Self::FiveYears => "5y",
            Self::SevenYears => "7y",
            Self::NineYears => "9y",
            Self::TenYears => "10y",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::OneMonth),
            "3m" => Ok(Self::ThreeMonths),
            "6m" => Ok(Self::SixMonths),
            "ytd" => Ok(Self::Ytd),
            "1y" => Ok(Self::OneYear),
            "3y" => Ok(Self::ThreeYears),
            "5y" => Ok(Self::FiveYears),
            "7y" => Ok(Self::SevenYears),
            "9y" => Ok(Self::NineYears),
            "10y" => Ok(Self::TenYears),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

/// Kind of instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentKind {
    Etf,
    Fund,
    #[default]
    Unknown,
}

/// Dividend/coupon distribution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionPolicy {
    Accumulating,
    Distributing,
    #[default]
    Unknown,
}

/// Category classification system.
///
/// Two independent taxonomies classify instruments; a static mapping table
/// translates between them (see the core crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taxonomy {
    /// Primary taxonomy.
    Morningstar,
    /// Italian industry classification.
    Assogestioni,
}
