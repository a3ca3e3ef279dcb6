//! Benchmark module - resolution tiers and the time-bounded cache.

mod cache;
mod resolver;

pub use cache::{BenchmarkCache, CacheStatus};
pub use resolver::{BenchmarkResolver, PreloadFailure, PreloadReport, PreloadedBenchmark};
