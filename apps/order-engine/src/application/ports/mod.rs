//! Application Ports (Driven)
//!
//! Ports define interfaces for interacting with external systems.

mod directory_port;
mod event_publisher_port;
mod execution_gateway_port;
mod webhook_sender_port;

pub use directory_port::{DirectoryError, DirectoryPort};
pub use event_publisher_port::{EventPublishError, EventPublisherPort, NoOpEventPublisher};
pub use execution_gateway_port::{
    AccessToken, ExecutionGatewayPort, ExternalStatusEntry, GatewayError, GatewayOrderAck,
    GatewayOrderRequest, PriceQuote, PriceRequest,
};
pub use webhook_sender_port::{
    WebhookDelivery, WebhookEnvelope, WebhookSendError, WebhookSenderPort,
};
