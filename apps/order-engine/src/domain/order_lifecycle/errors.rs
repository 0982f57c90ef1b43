//! Order lifecycle errors.

use std::fmt;

use super::value_objects::OrderStatus;

/// Errors raised by the order aggregate and its repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Transition refused by the strict state machine.
    InvalidStateTransition {
        /// Current status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for refusal.
        reason: String,
    },

    /// Invalid order parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// A gateway correlation id was already assigned a different value.
    ExternalIdImmutable {
        /// Field name (`order_id` or `foreign_id`).
        field: &'static str,
        /// Value already on the order.
        current: String,
        /// Value that was refused.
        attempted: String,
    },

    /// Status string outside the known external vocabulary.
    UnknownExternalStatus {
        /// Raw value from the gateway.
        value: String,
    },

    /// Order not found.
    NotFound {
        /// Order ID.
        order_id: String,
    },

    /// Storage backend failure.
    Storage {
        /// Error details.
        message: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid order state transition: {from} -> {to}: {reason}"
                )
            }
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid order parameter '{field}': {message}")
            }
            Self::ExternalIdImmutable {
                field,
                current,
                attempted,
            } => {
                write!(
                    f,
                    "Order {field} is already set to {current}, refusing {attempted}"
                )
            }
            Self::UnknownExternalStatus { value } => {
                write!(f, "Unknown external order status: {value}")
            }
            Self::NotFound { order_id } => {
                write!(f, "Order not found: {order_id}")
            }
            Self::Storage { message } => {
                write!(f, "Order storage error: {message}")
            }
        }
    }
}

impl std::error::Error for OrderError {}
