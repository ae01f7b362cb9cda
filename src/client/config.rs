//! Room session configuration

use std::sync::Arc;
use std::time::Duration;

use crate::roster::{LexicographicOrder, SelectionPolicy};

/// Join retry backoff settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRetryConfig {
    /// Delay before the first retry
    pub min_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Total join attempts, the first one included, before giving up
    pub max_attempts: usize,

    /// Randomise each delay
    pub jitter: bool,
}

impl Default for JoinRetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_attempts: 8,
            jitter: true,
        }
    }
}

impl JoinRetryConfig {
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the attempt ceiling (at least one attempt is always made)
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn disable_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }
}

/// Room session configuration options
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Capacity of the worker command queue
    pub command_capacity: usize,

    /// Capacity of the host event queue
    pub event_capacity: usize,

    /// Join retry backoff
    pub join_retry: JoinRetryConfig,

    /// Which publishing peer becomes the active media peer
    pub selection: Arc<dyn SelectionPolicy>,

    /// Check subscription invariants after every roster pass
    pub invariant_guard: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            command_capacity: 256,
            event_capacity: 256,
            join_retry: JoinRetryConfig::default(),
            selection: Arc::new(LexicographicOrder),
            invariant_guard: true,
        }
    }
}

impl RoomConfig {
    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn join_retry(mut self, retry: JoinRetryConfig) -> Self {
        self.join_retry = retry;
        self
    }

    pub fn selection(mut self, policy: impl SelectionPolicy + 'static) -> Self {
        self.selection = Arc::new(policy);
        self
    }

    pub fn disable_invariant_guard(mut self) -> Self {
        self.invariant_guard = false;
        self
    }
}
