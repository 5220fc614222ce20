//! Retry schedule for the UI error boundary.
//!
//! The first `max_automatic_retries` failures are retried automatically with
//! exponential backoff (1 s, 2 s, 4 s by default); after that the boundary
//! shows its fallback and only a manual retry resets the count.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_automatic_retries")]
    pub max_automatic_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_automatic_retries: default_max_automatic_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Delay before the automatic retry following the `failure`-th failure
    /// (1-based), or `None` once automatic retries are used up.
    pub fn delay_for(&self, failure: u32) -> Option<Duration> {
        if failure == 0 || failure > self.max_automatic_retries {
            return None;
        }
        let factor = 1u64.checked_shl(failure - 1).unwrap_or(u64::MAX);
        Some(Duration::from_millis(self.base_delay_ms.saturating_mul(factor)))
    }
}

fn default_max_automatic_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Failure counter held by one error boundary.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    failures: u32,
}

impl RetryState {
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn record_failure(&mut self, policy: &RetryPolicy) -> RetryDecision {
        self.failures = self.failures.saturating_add(1);
        match policy.delay_for(self.failures) {
            Some(delay) => RetryDecision::RetryAfter(delay),
            None => {
                warn!(failures = self.failures, "automatic retries exhausted");
                RetryDecision::GiveUp
            }
        }
    }

    /// Manual retry or a successful render.
    pub fn reset(&mut self) {
        self.failures = 0;
    }
}
