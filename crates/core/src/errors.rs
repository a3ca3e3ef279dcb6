//! Core error types for the Fundscope application.

use thiserror::Error;

use fundscope_market_data::errors::SourceError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the comparison/universe layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Universe load failed: {0}")]
    UniverseLoad(String),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] SourceError),
}
