//! Webhook DTOs (inbound events and subscriptions)

use serde::{Deserialize, Serialize};

use crate::application::services::DeadLetter;
use crate::domain::order_lifecycle::value_objects::{KycStatus, OrderStatus};
use crate::domain::shared::Timestamp;
use crate::domain::subscriptions::{DeliveryMethod, WebhookSubscription};

/// Inbound gateway event body: `{version, timestamp, event, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundWebhookDto {
    /// Payload version.
    #[serde(default)]
    pub version: Option<String>,
    /// Sender timestamp.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Event name.
    pub event: String,
    /// Event data (`orderId`, `customerId`, `remarks`, ...).
    #[serde(default)]
    pub data: serde_json::Value,
}

/// What ingestion did with an event. Never surfaced to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Order status updated.
    OrderUpdated {
        /// Local order id.
        order_id: String,
        /// New status.
        status: OrderStatus,
    },
    /// KYC verdict fanned out to linked accounts.
    KycPublished {
        /// Customer reference.
        customer_id: String,
        /// Verdict.
        status: KycStatus,
        /// Number of linked accounts.
        accounts: usize,
    },
    /// Strict mode refused the transition; the order is unchanged.
    Rejected {
        /// Local order id.
        order_id: String,
        /// Refusal reason.
        reason: String,
    },
    /// Nothing changed.
    Ignored {
        /// Why.
        reason: String,
    },
}

/// DTO for registering a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterSubscriptionDto {
    /// Delivery URL.
    pub url: String,
    /// HTTP method (default POST).
    #[serde(default)]
    pub method: DeliveryMethod,
    /// Event names.
    pub events: Vec<String>,
}

/// DTO representing a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionDto {
    /// Owning account.
    pub account_id: String,
    /// Delivery URL.
    pub url: String,
    /// HTTP method.
    pub method: DeliveryMethod,
    /// Event names.
    pub events: Vec<String>,
}

impl SubscriptionDto {
    /// Create from a domain subscription.
    #[must_use]
    pub fn from_subscription(subscription: &WebhookSubscription) -> Self {
        Self {
            account_id: subscription.account_id().to_string(),
            url: subscription.url().to_string(),
            method: subscription.method(),
            events: subscription.events().iter().cloned().collect(),
        }
    }
}

/// DTO for a delivery that exhausted its retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterDto {
    /// Target URL.
    pub url: String,
    /// Event name.
    pub event: String,
    /// Last error seen.
    pub error: String,
    /// Attempts made.
    pub attempts: u32,
    /// When the delivery was given up.
    pub failed_at: Timestamp,
}

impl From<DeadLetter> for DeadLetterDto {
    fn from(letter: DeadLetter) -> Self {
        Self {
            url: letter.url,
            event: letter.event,
            error: letter.error,
            attempts: letter.attempts,
            failed_at: letter.failed_at,
        }
    }
}
