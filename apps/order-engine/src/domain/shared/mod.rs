//! Shared Domain Types
//!
//! Identifiers and timestamps shared across bounded contexts.

pub mod value_objects;

pub use value_objects::{
    AccountId, CustomerId, ExternalOrderId, ForeignId, GroupId, OrderId, ProductId, Timestamp,
    TransactionId, UserId,
};
