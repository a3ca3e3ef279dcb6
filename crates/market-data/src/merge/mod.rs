//! Record aggregation - grouping, conflict resolution, quality scoring.

mod merger;
mod quality;

pub use merger::RecordMerger;
pub use quality::QualityWeights;
