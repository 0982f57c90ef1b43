//! Webhook Sender Port (Driven Port)
//!
//! Outbound HTTP delivery to a subscriber endpoint.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::order_lifecycle::events::DomainEvent;
use crate::domain::subscriptions::DeliveryMethod;

/// Body sent to subscribers: `{event, payload}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookEnvelope {
    /// Event name.
    pub event: String,
    /// Event data.
    pub payload: DomainEvent,
}

/// One outbound call.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    /// Subscriber URL.
    pub url: String,
    /// HTTP method.
    pub method: DeliveryMethod,
    /// Request body.
    pub body: WebhookEnvelope,
}

/// Delivery error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WebhookSendError {
    /// Transport failure or timeout.
    #[error("Webhook transport error: {message}")]
    Transport {
        /// Error details.
        message: String,
    },

    /// Subscriber answered with a non-2xx status.
    #[error("Webhook endpoint returned HTTP {status}")]
    HttpStatus {
        /// Status code.
        status: u16,
    },
}

/// Port for outbound webhook delivery.
#[async_trait]
pub trait WebhookSenderPort: Send + Sync {
    /// Deliver one envelope.
    async fn send(&self, delivery: &WebhookDelivery) -> Result<(), WebhookSendError>;
}
