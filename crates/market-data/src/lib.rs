//! Fundscope Market Data Crate
//!
//! Source-agnostic acquisition and aggregation of fund/ETF performance data
//! for the Fundscope application.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Multiple sources: JustETF, Morningstar, Investing.com
//! - ISIN-keyed deduplication and priority-based conflict resolution
//! - Per-source rate limiting and failure isolation
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  SearchCriteria  | --> |  Orchestrator    |  (bounded fan-out)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    DataSource    |  (JustETF, Morningstar, ...)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   SourceRecord   |  (raw, per-source)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   RecordMerger   |  (group / resolve / score)
//!                          +------------------+
//!                                  |
//!                                  v
//!                       +-----------------------+
//!                       | AggregatedInstrument  |  (one per ISIN)
//!                       +-----------------------+
//! ```
//!
//! # Core Types
//!
//! - [`SourceRecord`] - One observation of an instrument from one source
//! - [`AggregatedInstrument`] - The merge output, one per ISIN
//! - [`SearchCriteria`] - Filter specification for a multi-source search
//! - [`RecordMerger`] - Grouping, conflict resolution, quality scoring
//! - [`SearchOrchestrator`] - Bounded fan-out across sources

pub mod errors;
pub mod merge;
pub mod models;
pub mod progress;
pub mod registry;
pub mod source;

// Re-export all public types from models
pub use models::{
    AggregatedInstrument, DistributionPolicy, InstrumentKind, PerformanceData, Period,
    RiskMetrics, SearchCriteria, Source, SourceRecord, Taxonomy,
};

// Re-export merge types
pub use merge::{QualityWeights, RecordMerger};

// Re-export source traits
pub use source::{DataSource, InstrumentFetcher};

// Re-export orchestration types
pub use progress::ProgressCallback;
pub use registry::{RateLimiter, SearchConfig, SearchOrchestrator, DEFAULT_SOURCE_PRIORITY};
