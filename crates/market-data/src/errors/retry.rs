//! Retry classification for source errors.

/// How the orchestrator should react to a source failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Terminal for this source; retrying won't help.
    Never,
    /// Transient; retry the same source once after a backoff.
    WithBackoff,
    /// This source can't serve the request; move on to the next one.
    NextSource,
}
