//! Inbound gateway event vocabulary and its dispatch table.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::OrderStatus;

/// KYC verdict delivered for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    /// KYC accepted.
    Accepted,
    /// KYC rejected; remarks explain why.
    Rejected,
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// What an inbound event acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// Set the status of the order identified by `data.orderId`.
    Order(OrderStatus),
    /// Fan a KYC verdict out to the accounts of the customer in `data.customerId`.
    Customer(KycStatus),
}

/// Event names the gateway sends to the shared webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GatewayEvent {
    /// Customer KYC rejected.
    KycRejected,
    /// Customer KYC accepted.
    KycAccepted,
    /// E-sign started.
    DigioSignInitiated,
    /// E-sign completed.
    DigioSignSuccess,
    /// E-sign failed.
    DigioSignFailed,
    /// Order created at the venue.
    OrderCreated,
    /// Order processed.
    OrderProcessed,
    /// Order rejected.
    OrderRejected,
    /// Payment received.
    PaymentSuccess,
    /// Payment failed.
    PaymentFailed,
}

impl GatewayEvent {
    /// The full inbound vocabulary.
    pub const ALL: [Self; 10] = [
        Self::KycRejected,
        Self::KycAccepted,
        Self::DigioSignInitiated,
        Self::DigioSignSuccess,
        Self::DigioSignFailed,
        Self::OrderCreated,
        Self::OrderProcessed,
        Self::OrderRejected,
        Self::PaymentSuccess,
        Self::PaymentFailed,
    ];

    /// Resolve an event name; `None` for anything outside the vocabulary.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }

    /// Wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::KycRejected => "kycRejected",
            Self::KycAccepted => "kycAccepted",
            Self::DigioSignInitiated => "digioSignInitiated",
            Self::DigioSignSuccess => "digioSignSuccess",
            Self::DigioSignFailed => "digioSignFailed",
            Self::OrderCreated => "orderCreated",
            Self::OrderProcessed => "orderProcessed",
            Self::OrderRejected => "orderRejected",
            Self::PaymentSuccess => "paymentSuccess",
            Self::PaymentFailed => "paymentFailed",
        }
    }

    /// Dispatch table entry for this event.
    #[must_use]
    pub const fn target(&self) -> EventTarget {
        match self {
            Self::KycRejected => EventTarget::Customer(KycStatus::Rejected),
            Self::KycAccepted => EventTarget::Customer(KycStatus::Accepted),
            Self::DigioSignInitiated => EventTarget::Order(OrderStatus::DigioSignInitiated),
            Self::DigioSignSuccess => EventTarget::Order(OrderStatus::DigioSignSuccess),
            Self::DigioSignFailed => EventTarget::Order(OrderStatus::DigioSignFailed),
            Self::OrderCreated => EventTarget::Order(OrderStatus::OrderCreated),
            Self::OrderProcessed => EventTarget::Order(OrderStatus::OrderProcessed),
            Self::OrderRejected => EventTarget::Order(OrderStatus::OrderRejected),
            Self::PaymentSuccess => EventTarget::Order(OrderStatus::PaymentSuccess),
            Self::PaymentFailed => EventTarget::Order(OrderStatus::PaymentFailed),
        }
    }
}

impl fmt::Display for GatewayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("digioSignInitiated", OrderStatus::DigioSignInitiated)]
    #[test_case("digioSignSuccess", OrderStatus::DigioSignSuccess)]
    #[test_case("digioSignFailed", OrderStatus::DigioSignFailed)]
    #[test_case("orderCreated", OrderStatus::OrderCreated)]
    #[test_case("orderProcessed", OrderStatus::OrderProcessed)]
    #[test_case("orderRejected", OrderStatus::OrderRejected)]
    #[test_case("paymentSuccess", OrderStatus::PaymentSuccess)]
    #[test_case("paymentFailed", OrderStatus::PaymentFailed)]
    fn order_events_dispatch_to_status(name: &str, expected: OrderStatus) {
        let event = GatewayEvent::from_name(name).unwrap();
        assert_eq!(event.target(), EventTarget::Order(expected));
    }

    #[test]
    fn kyc_events_dispatch_to_customer() {
        assert_eq!(
            GatewayEvent::KycRejected.target(),
            EventTarget::Customer(KycStatus::Rejected)
        );
        assert_eq!(
            GatewayEvent::KycAccepted.target(),
            EventTarget::Customer(KycStatus::Accepted)
        );
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(GatewayEvent::from_name("orderExploded").is_none());
        assert!(GatewayEvent::from_name("OrderProcessed").is_none());
    }

    #[test]
    fn serde_uses_wire_names() {
        for event in GatewayEvent::ALL {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{}\"", event.name()));
        }
    }
}
