//! Decorrelated-jitter backoff.
//!
//! Each delay is drawn from `[base, 3 x previous]` and clamped to `max`, so
//! retries against a struggling access node spread out without ever sleeping
//! past the configured ceiling.

use rand::Rng;
use std::time::Duration;

/// Delay sequence for one retried call.
#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    previous_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        let base_ms = base_ms.min(max_ms);
        Self {
            base_ms,
            max_ms,
            previous_ms: base_ms,
        }
    }

    /// Delay before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let upper = self.previous_ms.saturating_mul(3).min(self.max_ms);
        let delay = if upper > self.base_ms {
            rand::thread_rng().gen_range(self.base_ms..=upper)
        } else {
            self.base_ms
        };
        self.previous_ms = delay;
        Duration::from_millis(delay)
    }
}
