//! Webhook Subscriptions Bounded Context
//!
//! Tenant-registered delivery targets for re-published status changes.

pub mod errors;
pub mod repository;
pub mod subscription;

pub use errors::SubscriptionError;
pub use repository::SubscriptionRepository;
pub use subscription::{DeliveryMethod, WebhookSubscription};
