//! Domain events for the order lifecycle.
//!
//! Consumed by the webhook fan-out dispatcher. The `event` name on each
//! event is the key subscribers register for.

use serde::{Deserialize, Serialize};

use super::value_objects::{GatewayEvent, KycStatus, OrderStatus};
use crate::domain::shared::{AccountId, CustomerId, OrderId, Timestamp};

/// Event name for the status change after the gateway order is created.
pub const DOCUMENT_OPENED_EVENT: &str = "documentOpened";
/// Event name for the lazy PAYMENT_LINK_SENT -> PAYMENT_LINK_OPENED read.
pub const PAYMENT_LINK_OPENED_EVENT: &str = "paymentLinkOpened";
/// Event name for an IPO row placed with the gateway after consent.
pub const IPO_ORDER_PLACED_EVENT: &str = "ipoOrderPlaced";
/// Event name for a status taken from a cancellation response.
pub const CANCELLATION_UPDATED_EVENT: &str = "cancellationUpdated";
/// Event name for a status taken from the transaction timeline.
pub const TIMELINE_RECONCILED_EVENT: &str = "timelineReconciled";

/// Names of events raised by the engine itself rather than the gateway.
pub const INTERNAL_EVENT_NAMES: [&str; 5] = [
    DOCUMENT_OPENED_EVENT,
    PAYMENT_LINK_OPENED_EVENT,
    IPO_ORDER_PLACED_EVENT,
    CANCELLATION_UPDATED_EVENT,
    TIMELINE_RECONCILED_EVENT,
];

/// True if subscribers may register for `name`.
#[must_use]
pub fn is_subscribable_event(name: &str) -> bool {
    GatewayEvent::from_name(name).is_some() || INTERNAL_EVENT_NAMES.contains(&name)
}

/// All domain events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    /// An order's status changed.
    OrderStatusChanged(OrderStatusChanged),
    /// A customer's KYC verdict arrived.
    CustomerKycChanged(CustomerKycChanged),
}

impl DomainEvent {
    /// Subscription key.
    #[must_use]
    pub fn event_name(&self) -> &str {
        match self {
            Self::OrderStatusChanged(e) => &e.event,
            Self::CustomerKycChanged(e) => &e.event,
        }
    }

    /// Accounts the event must be delivered to.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        match self {
            Self::OrderStatusChanged(e) => vec![e.account_id.clone()],
            Self::CustomerKycChanged(e) => e.account_ids.clone(),
        }
    }

    /// When the event occurred.
    #[must_use]
    pub const fn occurred_at(&self) -> Timestamp {
        match self {
            Self::OrderStatusChanged(e) => e.occurred_at,
            Self::CustomerKycChanged(e) => e.occurred_at,
        }
    }
}

/// Event: an order moved to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    /// Local order id.
    pub order_id: OrderId,
    /// Status before the change.
    pub previous_status: OrderStatus,
    /// Status after the change.
    pub new_status: OrderStatus,
    /// Owning account.
    pub account_id: AccountId,
    /// Name of the trigger (gateway event name or an internal event name).
    pub event: String,
    /// When it happened.
    pub occurred_at: Timestamp,
}

/// Event: a customer KYC verdict, addressed to every linked account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerKycChanged {
    /// Customer the verdict is about.
    pub customer_id: CustomerId,
    /// Verdict.
    pub kyc_status: KycStatus,
    /// Every account linked to the customer.
    pub account_ids: Vec<AccountId>,
    /// Free-text remarks from the gateway.
    pub remarks: Option<String>,
    /// Gateway event name.
    pub event: String,
    /// When it happened.
    pub occurred_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribable_events_cover_both_vocabularies() {
        assert!(is_subscribable_event("orderProcessed"));
        assert!(is_subscribable_event("kycRejected"));
        assert!(is_subscribable_event(PAYMENT_LINK_OPENED_EVENT));
        assert!(!is_subscribable_event("orderExploded"));
    }

    #[test]
    fn kyc_event_targets_all_linked_accounts() {
        let event = DomainEvent::CustomerKycChanged(CustomerKycChanged {
            customer_id: CustomerId::new("cust-1"),
            kyc_status: KycStatus::Rejected,
            account_ids: vec![AccountId::new("a1"), AccountId::new("a2")],
            remarks: Some("PAN mismatch".to_string()),
            event: "kycRejected".to_string(),
            occurred_at: Timestamp::now(),
        });

        assert_eq!(event.event_name(), "kycRejected");
        assert_eq!(event.account_ids().len(), 2);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = DomainEvent::OrderStatusChanged(OrderStatusChanged {
            order_id: OrderId::new("o-1"),
            previous_status: OrderStatus::DigioSignSuccess,
            new_status: OrderStatus::OrderProcessed,
            account_id: AccountId::new("a1"),
            event: "orderProcessed".to_string(),
            occurred_at: Timestamp::now(),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ORDER_STATUS_CHANGED");
        assert_eq!(json["new_status"], "ORDER_PROCESSED");
    }
}
