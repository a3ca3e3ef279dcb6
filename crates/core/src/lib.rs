//! Fundscope Core Crate
//!
//! Comparison engine for a fund/ETF selection workflow: loads the user's
//! portfolio ("universe") from a spreadsheet export, enriches it with
//! multi-source market data, and ranks it against market benchmarks.
//!
//! The heavy lifting around data acquisition (source traits, merging, rate
//! limiting) lives in `fundscope-market-data`; this crate owns the universe
//! model, the comparison pipelines, and benchmark resolution.

pub mod benchmark;
pub mod comparison;
pub mod constants;
pub mod errors;
pub mod taxonomies;
pub mod universe;

pub use benchmark::{BenchmarkCache, BenchmarkResolver};
pub use comparison::{
    compare_universe, BenchmarkComparison, BenchmarkReport, ComparisonEngine, ComparisonEntry,
    ComparisonMode, ComparisonReport, ComparisonStatistics, Origin,
};
pub use errors::{Error, Result};
pub use universe::{UniverseInstrument, UniverseLoadResult, UniverseLoader};
