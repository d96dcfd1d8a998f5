//! Retry policy for plugin initialization attempts.
//!
//! The policy is a pure decision table; the lifecycle manager owns the
//! loop and the actual sleeping, which keeps backoff behavior testable
//! without any network-bound step.

use std::time::Duration;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then try again.
    RetryAfter(Duration),
    /// The attempt budget is exhausted; surface the last error.
    GiveUp,
}

/// Delays applied between consecutive attempts. Total attempts is one
/// more than the number of delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// Creates a policy from explicit delays.
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// Creates a policy from delays in milliseconds, as configured.
    pub fn from_millis(delays_ms: &[u64]) -> Self {
        Self::new(delays_ms.iter().copied().map(Duration::from_millis).collect())
    }

    /// Total number of attempts this policy allows.
    pub fn attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Decision after the zero-based `attempt` failed.
    pub fn decide(&self, attempt: usize) -> RetryDecision {
        match self.delays.get(attempt) {
            Some(delay) => RetryDecision::RetryAfter(*delay),
            None => RetryDecision::GiveUp,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_millis(&[1000, 5000])
    }
}
