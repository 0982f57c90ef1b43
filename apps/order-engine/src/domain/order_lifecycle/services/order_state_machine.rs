//! Order State Machine Service
//!
//! Transition table for order statuses plus the mode switch that decides
//! whether the table is enforced.

use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::errors::OrderError;
use crate::domain::order_lifecycle::value_objects::OrderStatus;

/// How status updates are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Overwrite unconditionally, including replays onto terminal statuses.
    #[default]
    Compatibility,
    /// Only transitions in the table are applied.
    Strict,
}

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is in the table.
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::{
            DigioDocOpened, DigioDocSent, DigioSignFailed, DigioSignInitiated, DigioSignSuccess,
            OrderCancelled, OrderCreated, OrderFailed, OrderInitiated, OrderPending,
            OrderPrebooked, OrderProcessed, OrderRejected, OrderSuccess, PaymentFailed,
            PaymentLinkOpened, PaymentLinkSent, PaymentSuccess,
        };

        matches!(
            (from, to),
            // Single order creation
            (OrderInitiated, DigioDocOpened | OrderCreated | OrderFailed | OrderRejected | OrderCancelled)
                // IPO consent
                | (PaymentLinkSent, PaymentLinkOpened | OrderCreated | OrderCancelled)
                | (PaymentLinkOpened, OrderCreated | OrderCancelled | PaymentSuccess | PaymentFailed)
                // E-sign
                | (DigioDocOpened, DigioDocSent | DigioSignInitiated | DigioSignSuccess | DigioSignFailed | OrderCreated | OrderCancelled)
                | (DigioDocSent, DigioSignInitiated | DigioSignSuccess | DigioSignFailed | OrderCancelled)
                | (DigioSignInitiated, DigioSignSuccess | DigioSignFailed)
                | (DigioSignFailed, DigioSignInitiated | OrderCancelled)
                | (DigioSignSuccess, OrderCreated | OrderPending | OrderPrebooked | PaymentSuccess | PaymentFailed | OrderProcessed | OrderRejected)
                // Venue processing
                | (OrderCreated, DigioSignInitiated | DigioSignSuccess | OrderPending | OrderPrebooked | PaymentSuccess | PaymentFailed | OrderProcessed | OrderRejected | OrderCancelled | OrderSuccess | OrderFailed)
                | (OrderPending | OrderPrebooked, OrderPending | OrderPrebooked | PaymentSuccess | PaymentFailed | OrderProcessed | OrderRejected | OrderCancelled | OrderSuccess | OrderFailed)
                | (PaymentSuccess, OrderProcessed | OrderSuccess | OrderRejected | OrderFailed | OrderCancelled)
        ) && from != to
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is not in the table.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Validate according to `mode`; compatibility mode accepts everything.
    ///
    /// # Errors
    ///
    /// Returns error in strict mode if the transition is not in the table.
    pub fn check(mode: TransitionMode, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        match mode {
            TransitionMode::Compatibility => Ok(()),
            TransitionMode::Strict => Self::validate_transition(from, to),
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        if from == to {
            format!("Order is already {to}")
        } else if from.is_terminal() {
            format!("Order is in terminal status {from}, cannot transition to {to}")
        } else {
            format!("Invalid transition from {from} to {to}")
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|to| Self::is_valid_transition(from, *to))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_path_is_valid() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::OrderInitiated,
            OrderStatus::DigioDocOpened
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::DigioDocOpened,
            OrderStatus::DigioSignInitiated
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::DigioSignSuccess,
            OrderStatus::OrderProcessed
        ));
    }

    #[test]
    fn ipo_path_is_valid() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::PaymentLinkSent,
            OrderStatus::PaymentLinkOpened
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::PaymentLinkOpened,
            OrderStatus::OrderCreated
        ));
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for status in OrderStatus::ALL.into_iter().filter(OrderStatus::is_terminal) {
            assert!(
                OrderStateMachine::valid_next_states(status).is_empty(),
                "{status} should be terminal"
            );
        }
    }

    #[test]
    fn self_transition_is_invalid() {
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::OrderPending,
            OrderStatus::OrderPending
        ));
        let err = OrderStateMachine::validate_transition(
            OrderStatus::OrderPending,
            OrderStatus::OrderPending,
        )
        .unwrap_err();
        assert!(err.to_string().contains("already"));
    }

    #[test]
    fn replay_onto_terminal_is_rejected_in_strict_mode() {
        let result = OrderStateMachine::check(
            TransitionMode::Strict,
            OrderStatus::OrderProcessed,
            OrderStatus::DigioSignSuccess,
        );
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition { reason, .. }) if reason.contains("terminal")
        ));
    }

    #[test]
    fn compatibility_mode_accepts_any_transition() {
        assert!(
            OrderStateMachine::check(
                TransitionMode::Compatibility,
                OrderStatus::OrderProcessed,
                OrderStatus::DigioSignSuccess,
            )
            .is_ok()
        );
    }

    #[test]
    fn mode_deserializes_from_snake_case() {
        let mode: TransitionMode = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(mode, TransitionMode::Strict);
        assert_eq!(TransitionMode::default(), TransitionMode::Compatibility);
    }
}
