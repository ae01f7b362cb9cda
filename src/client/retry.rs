//! Join retry backoff (via the `backon` crate)

use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};

use super::config::JoinRetryConfig;

/// Delays between failed join attempts
///
/// Yields `max_attempts - 1` delays, then `None`.
pub(crate) struct JoinRetry {
    config: JoinRetryConfig,
    backoff: ExponentialBackoff,
    attempts: usize,
}

impl JoinRetry {
    pub fn new(config: JoinRetryConfig) -> Self {
        Self {
            backoff: Self::build(&config),
            config,
            attempts: 1,
        }
    }

    fn build(config: &JoinRetryConfig) -> ExponentialBackoff {
        let builder = ExponentialBuilder::default()
            .with_min_delay(config.min_delay)
            .with_max_delay(config.max_delay)
            .with_max_times(config.max_attempts.saturating_sub(1));

        if config.jitter {
            builder.with_jitter().build()
        } else {
            builder.build()
        }
    }

    /// Delay before the next attempt, or `None` once the budget is spent
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.backoff.next()?;
        self.attempts += 1;
        Some(delay)
    }

    /// Attempts made or scheduled, the first one included
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Start a fresh budget
    pub fn reset(&mut self) {
        self.backoff = Self::build(&self.config);
        self.attempts = 1;
    }
}

impl std::fmt::Debug for JoinRetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinRetry")
            .field("config", &self.config)
            .field("attempts", &self.attempts)
            .finish()
    }
}
