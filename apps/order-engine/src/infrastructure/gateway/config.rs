//! Execution gateway client configuration.

use std::time::Duration;

use crate::resilience::RetryPolicy;

/// Configuration for the HTTP execution gateway client.
#[derive(Debug, Clone)]
pub struct ExecutionGatewayConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Value of the `x-api-key` header.
    pub api_key: String,
    /// Request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Retry policy for transport errors and retryable statuses.
    pub retry: RetryPolicy,
}

impl ExecutionGatewayConfig {
    /// Create a configuration with no timeout and no retries.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: None,
            retry: RetryPolicy::no_retry(),
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ExecutionGatewayConfig::new("https://gw.test/api/", "key");
        assert_eq!(config.base_url, "https://gw.test/api");
        assert!(config.timeout.is_none());
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn builder_sets_timeout_and_retry() {
        let config = ExecutionGatewayConfig::new("https://gw.test", "key")
            .with_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::default());
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.retry.max_attempts, 3);
    }
}
