//! Order Lifecycle Bounded Context
//!
//! Order rows from creation through gateway placement, e-signing and
//! settlement.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: snapshots fixed at creation, immutable gateway ids
//! - **State Machine**: transition table with a compatibility (overwrite) mode
//! - **Gateway Events**: the fixed inbound vocabulary and its dispatch table
//! - **Saga Marker**: last completed creation step, used to resume

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{CreateOrderCommand, Order};
pub use errors::OrderError;
pub use events::{CustomerKycChanged, DomainEvent, OrderStatusChanged};
pub use repository::OrderRepository;
pub use services::{OrderStateMachine, TransitionMode};
pub use value_objects::{
    CustomerSnapshot, EventTarget, ExternalOrderStatus, GatewayEvent, KycStatus, OrderSagaStep,
    OrderStatus, ProductSnapshot, ProductType,
};
