//! Webhook subscription errors.

use std::fmt;

/// Errors raised by subscriptions and their repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Invalid subscription field.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Storage backend failure.
    Storage {
        /// Error details.
        message: String,
    },
}

impl fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid subscription parameter '{field}': {message}")
            }
            Self::Storage { message } => write!(f, "Subscription storage error: {message}"),
        }
    }
}

impl std::error::Error for SubscriptionError {}
