//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.

mod identifiers;
mod timestamp;

pub use identifiers::{
    AccountId, CustomerId, ExternalOrderId, ForeignId, GroupId, OrderId, ProductId,
    TransactionId, UserId,
};
pub use timestamp::Timestamp;
