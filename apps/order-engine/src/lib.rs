// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Order Engine - Rust Core Library
//!
//! Multi-tenant order lifecycle engine for an advisory investment platform.
//! Advisors place orders for customers; the engine drives them through an
//! external execution gateway, applies the gateway's asynchronous status
//! callbacks, re-publishes status changes to tenant webhook subscribers and
//! computes commission.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `order_lifecycle`: Order aggregate, status table, saga marker, gateway events
//!   - `commission`: Rate caps and the spread rules
//!   - `subscriptions`: Tenant webhook subscriptions
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`ExecutionGatewayPort`, `DirectoryPort`)
//!   - `use_cases`: `CreateOrder`, `IpoBid`, `IngestWebhook`, `CalculateCommission`,
//!     `QueryOrders`, `ManageSubscription`, `ReconcileOrders`
//!   - `services`: Reportee resolution and webhook fan-out
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `gateway`: reqwest execution gateway client and in-process mock
//!   - `persistence`: In-memory repositories and YAML seed data
//!   - `webhook`: Outbound webhook sender
//!   - `http`: axum REST API and gateway callback endpoint
//!   - `config`: Dependency injection container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration with environment interpolation.
pub mod config;

/// Error taxonomy and HTTP mapping.
pub mod error;

/// Structured logging and Prometheus metrics.
pub mod observability;

/// Retry policies for outbound calls.
pub mod resilience;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::order_lifecycle::{Order, OrderStatus, TransitionMode};
pub use domain::shared::{AccountId, CustomerId, GroupId, OrderId, Timestamp, UserId};

// Application re-exports
pub use application::dto::{CreateOrderDto, OrderDto, Session};
pub use application::ports::{ExecutionGatewayPort, NoOpEventPublisher};
pub use application::services::{DeliveryMode, WebhookFanoutDispatcher};
pub use application::use_cases::{
    CalculateCommissionUseCase, CreateOrderUseCase, IngestWebhookUseCase, IpoBidUseCase,
    ManageSubscriptionUseCase, QueryOrdersUseCase, ReconcileOrdersUseCase,
};

// Infrastructure re-exports
pub use infrastructure::config::{Container, EnginePorts, EngineSettings, InMemoryPorts};
pub use infrastructure::gateway::{HttpExecutionGateway, MockExecutionGateway};
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::persistence::InMemoryOrderRepository;

// Cross-cutting re-exports
pub use config::{Config, ConfigError, load_config};
pub use error::{EngineError, ErrorCode};
