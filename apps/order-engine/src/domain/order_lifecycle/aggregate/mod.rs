//! Order Lifecycle Aggregates

mod order;

pub use order::{CreateOrderCommand, Order};
