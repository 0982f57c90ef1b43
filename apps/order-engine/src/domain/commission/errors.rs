//! Commission errors.

use std::fmt;

/// Errors from rate cap lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateCapError {
    /// Storage backend failure.
    Storage {
        /// Error details.
        message: String,
    },
}

impl fmt::Display for RateCapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage { message } => write!(f, "Rate cap storage error: {message}"),
        }
    }
}

impl std::error::Error for RateCapError {}
