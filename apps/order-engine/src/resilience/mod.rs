//! Resilience patterns for external calls.

mod backoff;

pub use backoff::{ExponentialBackoff, RetryPolicy, is_retryable_status};
