//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Consistency boundaries with invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Events**: Records of state transitions
//! - **Domain Services**: Stateless business logic
//! - **Repository Traits**: Persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`order_lifecycle`]: Order rows, status machine, gateway event vocabulary
//! - [`commission`]: Rate caps and spread rules
//! - [`subscriptions`]: Tenant webhook delivery targets

pub mod commission;
pub mod order_lifecycle;
pub mod shared;
pub mod subscriptions;
