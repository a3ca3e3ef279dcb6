//! Data source trait definitions.
//!
//! This module defines the `DataSource` trait that all scraper adapters must
//! implement, plus the narrower `InstrumentFetcher` capability the comparison
//! layer consumes.

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::models::{
    AggregatedInstrument, InstrumentKind, SearchCriteria, Source, SourceRecord,
};
use crate::progress::ProgressCallback;

/// Trait for scraper adapters.
///
/// Implement this trait to add support for a new data platform. The
/// orchestrator uses `supported_kinds` to skip sources that cannot serve a
/// query, fans searches out concurrently, and isolates per-source failures.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use fundscope_market_data::source::DataSource;
///
/// struct JustEtfScraper {
///     client: reqwest::Client,
/// }
///
/// #[async_trait]
/// impl DataSource for JustEtfScraper {
///     fn id(&self) -> Source {
///         Source::JustEtf
///     }
///
///     fn supported_kinds(&self) -> &[InstrumentKind] {
///         &[InstrumentKind::Etf]
///     }
///
///     // ... implement search and lookup
/// }
/// ```
#[async_trait]
pub trait DataSource: Send + Sync {
    /// The source this adapter scrapes.
    fn id(&self) -> Source;

    /// Instrument kinds this source can report on.
    fn supported_kinds(&self) -> &[InstrumentKind];

    /// Search instruments matching the criteria.
    ///
    /// Implementations may report progress through `progress`; the callback
    /// is already panic-isolated by the caller side helpers.
    async fn search(
        &self,
        criteria: &SearchCriteria,
        progress: Option<ProgressCallback>,
    ) -> Result<Vec<SourceRecord>, SourceError>;

    /// Fetch a single instrument by ISIN.
    ///
    /// Returns `Ok(None)` when the source simply does not know the
    /// instrument; errors are reserved for transport or parse failures.
    async fn get_by_isin(&self, isin: &str) -> Result<Option<SourceRecord>, SourceError>;

    /// Whether the source is currently reachable.
    ///
    /// Default implementation assumes yes; adapters with a cheap ping
    /// endpoint should override.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Capability the comparison layer needs from the market-data side:
/// criteria search and ISIN enrichment, both returning merged instruments.
#[async_trait]
pub trait InstrumentFetcher: Send + Sync {
    /// Search all sources and return merged, deduplicated instruments.
    async fn search(
        &self,
        criteria: &SearchCriteria,
        progress: Option<ProgressCallback>,
    ) -> Vec<AggregatedInstrument>;

    /// Enrich a list of ISINs with data from all sources.
    async fn enrich_by_isins(
        &self,
        isins: &[String],
        progress: Option<ProgressCallback>,
    ) -> Vec<AggregatedInstrument>;
}
