// Copyright 2025-Present the console-relay authors.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Per-request retry policy applied while shipping a single batch.
///
/// This is independent of the outer re-queue loop: once a batch exhausts its
/// attempts it is restored to the queue and picked up by the next scheduled
/// flush.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Up to the given number of attempts, back to back.
    Immediate(u32),
    /// Up to the given number of attempts with a growing pause between them:
    /// the n-th retry waits n times the base delay in milliseconds.
    LinearBackoff(u32, u64),
}

impl RetryStrategy {
    /// Total number of attempts, never less than one.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryStrategy::Immediate(attempts) | RetryStrategy::LinearBackoff(attempts, _) => {
                (*attempts).max(1)
            }
        }
    }

    /// Pause before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            RetryStrategy::Immediate(_) => Duration::ZERO,
            RetryStrategy::LinearBackoff(_, base_ms) => {
                Duration::from_millis(base_ms.saturating_mul(u64::from(retry)))
            }
        }
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::Immediate(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryStrategy::Immediate(0).attempts(), 1);
        assert_eq!(RetryStrategy::LinearBackoff(0, 100).attempts(), 1);
        assert_eq!(RetryStrategy::Immediate(3).attempts(), 3);
    }

    #[test]
    fn test_backoff_grows_linearly() {
        let strategy = RetryStrategy::LinearBackoff(3, 250);
        assert_eq!(strategy.delay(1), Duration::from_millis(250));
        assert_eq!(strategy.delay(2), Duration::from_millis(500));
    }

    #[test]
    fn test_immediate_has_no_delay() {
        assert_eq!(RetryStrategy::Immediate(3).delay(2), Duration::ZERO);
    }
}
