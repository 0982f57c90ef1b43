//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order row.
///
/// Single orders start in `OrderInitiated`, IPO batch rows in
/// `PaymentLinkSent`. Everything after that is driven by the gateway
/// (webhooks, cancellation results, timeline reconciliation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Gateway accepted the order.
    OrderCreated,
    /// Gateway is processing the order.
    OrderPending,
    /// Pre-booked with the issuer.
    OrderPrebooked,
    /// Row persisted locally, gateway order not yet created.
    OrderInitiated,
    /// IPO consent link sent to the customer.
    PaymentLinkSent,
    /// IPO consent link opened by the customer.
    PaymentLinkOpened,
    /// Gateway order created, signing document opened.
    DigioDocOpened,
    /// Signing document sent to the customer.
    DigioDocSent,
    /// Customer started e-signing.
    DigioSignInitiated,
    /// E-signing completed.
    DigioSignSuccess,
    /// E-signing failed.
    DigioSignFailed,
    /// Order processed and settled.
    OrderProcessed,
    /// Order rejected by the gateway.
    OrderRejected,
    /// Order cancelled.
    OrderCancelled,
    /// Order completed successfully.
    OrderSuccess,
    /// Order failed at the gateway.
    OrderFailed,
    /// Payment received.
    PaymentSuccess,
    /// Payment failed.
    PaymentFailed,
}

impl OrderStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::OrderCreated,
        Self::OrderPending,
        Self::OrderPrebooked,
        Self::OrderInitiated,
        Self::PaymentLinkSent,
        Self::PaymentLinkOpened,
        Self::DigioDocOpened,
        Self::DigioDocSent,
        Self::DigioSignInitiated,
        Self::DigioSignSuccess,
        Self::DigioSignFailed,
        Self::OrderProcessed,
        Self::OrderRejected,
        Self::OrderCancelled,
        Self::OrderSuccess,
        Self::OrderFailed,
        Self::PaymentSuccess,
        Self::PaymentFailed,
    ];

    /// Returns true if no further transition is expected.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::OrderProcessed
                | Self::OrderRejected
                | Self::OrderCancelled
                | Self::OrderSuccess
                | Self::OrderFailed
                | Self::PaymentFailed
        )
    }

    /// Returns true while the order can still move.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Wire name (`ORDER_CREATED`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrderCreated => "ORDER_CREATED",
            Self::OrderPending => "ORDER_PENDING",
            Self::OrderPrebooked => "ORDER_PREBOOKED",
            Self::OrderInitiated => "ORDER_INITIATED",
            Self::PaymentLinkSent => "PAYMENT_LINK_SENT",
            Self::PaymentLinkOpened => "PAYMENT_LINK_OPENED",
            Self::DigioDocOpened => "DIGIO_DOC_OPENED",
            Self::DigioDocSent => "DIGIO_DOC_SENT",
            Self::DigioSignInitiated => "DIGIO_SIGN_INITIATED",
            Self::DigioSignSuccess => "DIGIO_SIGN_SUCCESS",
            Self::DigioSignFailed => "DIGIO_SIGN_FAILED",
            Self::OrderProcessed => "ORDER_PROCESSED",
            Self::OrderRejected => "ORDER_REJECTED",
            Self::OrderCancelled => "ORDER_CANCELLED",
            Self::OrderSuccess => "ORDER_SUCCESS",
            Self::OrderFailed => "ORDER_FAILED",
            Self::PaymentSuccess => "PAYMENT_SUCCESS",
            Self::PaymentFailed => "PAYMENT_FAILED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        let terminal: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(OrderStatus::is_terminal)
            .collect();
        assert_eq!(
            terminal,
            vec![
                OrderStatus::OrderProcessed,
                OrderStatus::OrderRejected,
                OrderStatus::OrderCancelled,
                OrderStatus::OrderSuccess,
                OrderStatus::OrderFailed,
                OrderStatus::PaymentFailed,
            ]
        );
    }

    #[test]
    fn payment_success_is_not_terminal() {
        assert!(OrderStatus::PaymentSuccess.is_active());
    }

    #[test]
    fn serde_names_match_display() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn parse_round_trips_wire_name() {
        assert_eq!(
            "DIGIO_DOC_OPENED".parse::<OrderStatus>().unwrap(),
            OrderStatus::DigioDocOpened
        );
        assert!("OPEN".parse::<OrderStatus>().is_err());
    }
}
