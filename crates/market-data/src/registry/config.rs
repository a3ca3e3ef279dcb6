//! Orchestrator configuration.

use std::env;
use std::time::Duration;

use log::warn;

/// Default number of concurrent source workers.
const DEFAULT_MAX_WORKERS: usize = 3;

/// Default per-source search timeout.
const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default backoff before retrying a transiently-failed source.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Settings for the multi-source search orchestrator.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of sources queried concurrently.
    pub max_workers: usize,
    /// Upper bound on one source's search, enforced by the orchestrator.
    pub source_timeout: Duration,
    /// Wait before the single retry granted to transient failures.
    pub retry_backoff: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl SearchConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `FUNDSCOPE_MAX_WORKERS`,
    /// `FUNDSCOPE_SOURCE_TIMEOUT_SECS`, `FUNDSCOPE_RETRY_BACKOFF_MS`.
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(value) = read_env("FUNDSCOPE_MAX_WORKERS") {
            match value.parse::<usize>() {
                Ok(n) if n > 0 => config.max_workers = n,
                _ => warn!("Ignoring invalid FUNDSCOPE_MAX_WORKERS: {value}"),
            }
        }
        if let Some(value) = read_env("FUNDSCOPE_SOURCE_TIMEOUT_SECS") {
            match value.parse::<u64>() {
                Ok(secs) if secs > 0 => config.source_timeout = Duration::from_secs(secs),
                _ => warn!("Ignoring invalid FUNDSCOPE_SOURCE_TIMEOUT_SECS: {value}"),
            }
        }
        if let Some(value) = read_env("FUNDSCOPE_RETRY_BACKOFF_MS") {
            match value.parse::<u64>() {
                Ok(ms) => config.retry_backoff = Duration::from_millis(ms),
                _ => warn!("Ignoring invalid FUNDSCOPE_RETRY_BACKOFF_MS: {value}"),
            }
        }

        config
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
