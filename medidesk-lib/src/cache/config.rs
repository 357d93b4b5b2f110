//! Cache configuration

use std::time::Duration;

/// Configuration for [`ResourceCache`](super::ResourceCache) fetch retry
/// behavior.
///
/// Failed fetches are retried a bounded number of times, with exponential
/// backoff, and only for transient failures (rate limiting, server
/// errors, network errors). The cache never retries beyond this budget;
/// the caller sees an `Error` status and may retry explicitly.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use medidesk_lib::cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .max_fetch_retries(2)
///     .initial_delay(Duration::from_millis(500));
///
/// let no_retry = CacheConfig::no_retry();
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Extra fetch attempts after the first failure.
    ///
    /// Default: 1
    pub max_fetch_retries: u32,

    /// Delay before the first retry (doubles each attempt).
    ///
    /// Default: 250ms
    pub initial_delay: Duration,

    /// Upper bound on the delay between retries.
    ///
    /// Default: 2s
    pub max_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_fetch_retries: 1,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl CacheConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config with retries disabled.
    pub fn no_retry() -> Self {
        Self {
            max_fetch_retries: 0,
            ..Default::default()
        }
    }

    /// Sets the number of extra fetch attempts after the first failure.
    pub fn max_fetch_retries(mut self, n: u32) -> Self {
        self.max_fetch_retries = n;
        self
    }

    /// Sets the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}
