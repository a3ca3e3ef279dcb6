//! Source boundary - traits implemented by scraper adapters.

mod traits;

pub use traits::{DataSource, InstrumentFetcher};
