//! Execution gateway connection settings.

use serde::{Deserialize, Serialize};

use crate::resilience::RetryPolicy;

/// Execution gateway settings.
///
/// Without a `base_url` the binary runs against the in-process mock gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Gateway base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Value of the `x-api-key` header.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in milliseconds; unset keeps the transport default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Retry policy. Gateway calls are not retried unless configured.
    #[serde(default = "RetryPolicy::no_retry")]
    pub retry: RetryPolicy,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: String::new(),
            timeout_ms: None,
            retry: RetryPolicy::no_retry(),
        }
    }
}

impl GatewaySettings {
    /// Base URL, treating an empty string (unset env var) as absent.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}
