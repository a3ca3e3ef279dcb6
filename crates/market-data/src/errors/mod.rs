//! Error types and retry classification for the source boundary.

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

use crate::models::Source;

/// Errors a data source can produce.
///
/// Each variant is classified into a [`RetryClass`] via
/// [`retry_class`](Self::retry_class); the orchestrator uses that to decide
/// between retrying with backoff and writing the source off for the batch.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The instrument was not found by the source. Terminal.
    #[error("Instrument not found: {0}")]
    NotFound(String),

    /// The source rate limited the request.
    #[error("Rate limited: {from_source}")]
    RateLimited {
        /// The source that rate limited the request.
        from_source: Source,
    },

    /// The request to the source timed out.
    #[error("Timeout: {from_source}")]
    Timeout {
        /// The source that timed out.
        from_source: Source,
    },

    /// The source returned a payload we could not interpret.
    #[error("Parse error from {from_source}: {message}")]
    Parse {
        /// The source that produced the payload.
        from_source: Source,
        /// What went wrong.
        message: String,
    },

    /// The source does not support the requested operation.
    #[error("Operation '{operation}' not supported by {from_source}")]
    NotSupported {
        /// The unsupported operation.
        operation: String,
        /// The source that was asked.
        from_source: Source,
    },

    /// A network error occurred while talking to the source.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SourceError {
    /// Returns the retry classification for this error.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::NotFound(_) | Self::NotSupported { .. } => RetryClass::Never,
            Self::RateLimited { .. } | Self::Timeout { .. } => RetryClass::WithBackoff,
            Self::Parse { .. } | Self::Network(_) => RetryClass::NextSource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_never_retries() {
        let error = SourceError::NotFound("XX0000000000".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = SourceError::RateLimited {
            from_source: Source::Morningstar,
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = SourceError::Timeout {
            from_source: Source::JustEtf,
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_parse_error_moves_on() {
        let error = SourceError::Parse {
            from_source: Source::Investing,
            message: "unexpected html".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextSource);
    }

    #[test]
    fn test_error_display() {
        let error = SourceError::RateLimited {
            from_source: Source::JustEtf,
        };
        assert_eq!(format!("{}", error), "Rate limited: justetf");
    }
}
