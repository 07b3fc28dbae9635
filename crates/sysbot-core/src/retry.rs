//! Retry strategies for operations the routine layer chooses to repeat.
//!
//! The resolver never retries on its own; callers pick a strategy and pass
//! it to e.g. [`crate::session::BotSession::identify_with_retry`].

use std::time::Duration;

pub trait RetryStrategy {
    /// Delay before retry number `retry` (starting at 1), or `None` to give up
    fn next_delay(&self, retry: u32) -> Option<Duration>;
}

/// Never retry
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryStrategy for NoRetry {
    fn next_delay(&self, _retry: u32) -> Option<Duration> {
        None
    }
}

/// Same delay between every attempt
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    pub delay: Duration,
    pub max_retries: u32,
}

impl FixedDelay {
    pub fn new(delay: Duration, max_retries: u32) -> Self {
        Self { delay, max_retries }
    }
}

impl RetryStrategy for FixedDelay {
    fn next_delay(&self, retry: u32) -> Option<Duration> {
        (retry <= self.max_retries).then_some(self.delay)
    }
}

/// Doubling delay, capped at `max_delay`
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub max_delay: Duration,
    pub max_retries: u32,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max_delay: Duration, max_retries: u32) -> Self {
        Self {
            initial,
            max_delay,
            max_retries,
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(10), 10)
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn next_delay(&self, retry: u32) -> Option<Duration> {
        if retry == 0 || retry > self.max_retries {
            return None;
        }
        let factor = 2u32.saturating_pow(retry - 1);
        Some(self.initial.saturating_mul(factor).min(self.max_delay))
    }
}
