//! Retry logic.
//!
//! # Responsibilities
//! - Run an async call with a bounded number of attempts
//! - Sleep with decorrelated-jitter backoff between attempts
//! - Let the caller decide which errors are retryable
//!
//! # Design Decisions
//! - The policy knows nothing about the ledger; callers pass a classifier
//! - Read/poll calls classify with `LedgerError::is_retryable`, submissions
//!   with `LedgerError::is_undelivered`
//! - The attempt number is handed to the call so it can rotate endpoints

use std::fmt::Display;
use std::future::Future;

use crate::config::schema::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;

/// Bounded retry with backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        if config.enabled {
            Self::new(config.max_attempts, config.base_delay_ms, config.max_delay_ms)
        } else {
            Self::no_retry()
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `call` receives the 0-based attempt number.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &'static str,
        should_retry: impl Fn(&E) -> bool,
        mut call: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut backoff = Backoff::new(self.base_delay_ms, self.max_delay_ms);
        let mut attempt = 0;
        loop {
            match call(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let next = attempt + 1;
                    if next >= self.max_attempts || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        operation,
                        attempt = next,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Ledger call failed, retrying"
                    );
                    metrics::record_retry(operation);
                    tokio::time::sleep(delay).await;
                    attempt = next;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
