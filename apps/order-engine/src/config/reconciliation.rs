//! Timeline reconciliation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Periodic timeline reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Enable the periodic sweep.
    #[serde(default)]
    pub enabled: bool,
    /// Interval between sweeps in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_interval_ms(),
        }
    }
}

impl ReconciliationConfig {
    /// Interval between sweeps.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

const fn default_interval_ms() -> u64 {
    300_000
}
