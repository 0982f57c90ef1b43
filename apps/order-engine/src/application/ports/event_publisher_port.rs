//! Event Publisher Port (Driven Port)
//!
//! Interface for publishing domain events to subscribers.

use async_trait::async_trait;

use crate::domain::order_lifecycle::events::DomainEvent;

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// A subscriber could not be reached; remaining deliveries were skipped.
    #[error("Webhook subscriber unavailable: {message}")]
    ServiceUnavailable {
        /// Error details.
        message: String,
    },

    /// Subscriptions could not be loaded.
    #[error("Event publish failed: {message}")]
    PublishFailed {
        /// Error details.
        message: String,
    },
}

/// Port for publishing domain events.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish events in order.
    async fn publish_events(&self, events: Vec<DomainEvent>) -> Result<(), EventPublishError>;

    /// Publish a single event.
    async fn publish_event(&self, event: DomainEvent) -> Result<(), EventPublishError> {
        self.publish_events(vec![event]).await
    }
}

/// No-op event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish_events(&self, _events: Vec<DomainEvent>) -> Result<(), EventPublishError> {
        Ok(())
    }
}
