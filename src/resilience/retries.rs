//! Retry policy for upstream fetches.
//!
//! # Design Decisions
//! - Disabled unless `retries.max_attempts` is raised above 1
//! - Only failures where nothing was received are retried; a request that
//!   got headers or partial body is never replayed
//! - Jittered backoff between attempts

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::upstream::FetchFailure;

/// Attempt budget and backoff bounds for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Whether another attempt may follow `attempt` (1-based) failing with `failure`.
    pub fn should_retry(&self, attempt: u32, failure: &FetchFailure) -> bool {
        attempt < self.max_attempts && is_retryable(failure)
    }

    /// Delay before the attempt following `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

/// Connection-level failures are safe to retry; anything after the
/// upstream started answering is not.
pub fn is_retryable(failure: &FetchFailure) -> bool {
    matches!(failure, FetchFailure::Unreachable(_))
}
