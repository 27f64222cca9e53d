//! Pipe configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bounded buffer capacity
pub const DEFAULT_BUFFER_SIZE: usize = 10_000;

/// Settings for [`PipedRdfIterator`](crate::PipedRdfIterator).
///
/// A consumer waiting on an empty buffer polls up to `max_polls` times,
/// `poll_timeout_ms` each, before declaring the producer stalled. A producer
/// waiting on a full buffer gives up on the consumer after the same bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// Items buffered before the producer blocks
    pub buffer_size: usize,
    pub poll_timeout_ms: u64,
    pub max_polls: u32,
    /// Hand the lock over fairly between threads after each operation
    pub fair: bool,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            poll_timeout_ms: 1_000,
            max_polls: 10,
            fair: false,
        }
    }
}

impl PipeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_polls(mut self, polls: u32) -> Self {
        self.max_polls = polls;
        self
    }

    pub fn with_fair(mut self, fair: bool) -> Self {
        self.fair = fair;
        self
    }

    /// Buffer capacity, never zero
    pub fn capacity(&self) -> usize {
        self.buffer_size.max(1)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// Settings for the backoff pipe: retry delay grows by `step_ms` per empty
/// poll, up to `max_delay_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub max_delay_ms: u64,
    pub step_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: 50,
            step_ms: 1,
        }
    }
}

impl BackoffConfig {
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step_ms = step.as_millis() as u64;
        self
    }

    /// Delay before the retry that follows `empty_polls` empty polls.
    pub fn delay(&self, empty_polls: u32) -> Duration {
        let ms = self
            .step_ms
            .saturating_mul(u64::from(empty_polls))
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}
