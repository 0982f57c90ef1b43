//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod calculate_commission;
mod create_order;
mod ingest_webhook;
mod ipo_bid;
mod manage_subscription;
mod query_orders;
mod reconcile_orders;
mod status_sync;

#[cfg(test)]
pub(crate) mod fixtures;

pub use calculate_commission::CalculateCommissionUseCase;
pub use create_order::CreateOrderUseCase;
pub use ingest_webhook::IngestWebhookUseCase;
pub use ipo_bid::IpoBidUseCase;
pub use manage_subscription::ManageSubscriptionUseCase;
pub use query_orders::QueryOrdersUseCase;
pub use reconcile_orders::{ReconcileOrdersUseCase, ReconciliationReport};
