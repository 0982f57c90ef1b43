//! Gateway client error types.

use thiserror::Error;

use crate::application::ports::GatewayError;

/// Errors from the HTTP gateway client.
#[derive(Debug, Error, Clone)]
pub enum GatewayClientError {
    /// Client could not be built.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Body or message returned.
        message: String,
    },

    /// The gateway answered `success: false`.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// API key refused.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited after all retries.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Transport error.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Body did not match the expected shape.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Retries exhausted.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Attempts made before giving up.
        attempts: u32,
    },
}

impl From<GatewayClientError> for GatewayError {
    fn from(err: GatewayClientError) -> Self {
        match err {
            GatewayClientError::Http(message) | GatewayClientError::Network(message) => {
                Self::ConnectionError { message }
            }
            GatewayClientError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {attempts} attempts"),
            },
            GatewayClientError::Timeout => Self::Timeout,
            GatewayClientError::Rejected(reason) => Self::Rejected { reason },
            GatewayClientError::RateLimited { .. } => Self::RateLimited,
            GatewayClientError::JsonParse(message) => Self::InvalidResponse { message },
            GatewayClientError::AuthenticationFailed => Self::Unknown {
                message: "Authentication failed".to_string(),
            },
            GatewayClientError::Api { status, message } => Self::Unknown {
                message: format!("{status}: {message}"),
            },
        }
    }
}
