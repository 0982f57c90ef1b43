//! Outbound webhook delivery configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::services::{
    DEFAULT_DEAD_LETTER_CAPACITY, DEFAULT_QUEUE_CAPACITY, DeliveryMode,
};
use crate::resilience::RetryPolicy;

/// Outbound webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhooksConfig {
    /// `fail_fast` or `isolated`.
    #[serde(default)]
    pub delivery_mode: DeliveryMode,
    /// Retry policy used in isolated mode.
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Per-delivery timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Event batches buffered for the delivery worker.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Dead letters kept before the oldest is evicted.
    #[serde(default = "default_dead_letter_capacity")]
    pub dead_letter_capacity: usize,
}

impl Default for WebhooksConfig {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryMode::default(),
            retry: RetryPolicy::default(),
            timeout_ms: None,
            queue_capacity: default_queue_capacity(),
            dead_letter_capacity: default_dead_letter_capacity(),
        }
    }
}

impl WebhooksConfig {
    /// Per-delivery timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

const fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

const fn default_dead_letter_capacity() -> usize {
    DEFAULT_DEAD_LETTER_CAPACITY
}
