//! Data model for multi-source fund/ETF market data.

pub mod isin;

mod aggregated;
mod criteria;
mod record;
mod types;

pub use aggregated::AggregatedInstrument;
pub use criteria::SearchCriteria;
pub use record::{PerformanceData, RiskMetrics, SourceRecord};
pub use types::{DistributionPolicy, InstrumentKind, Period, Source, Taxonomy};
