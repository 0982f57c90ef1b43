//! Infrastructure Layer
//!
//! This module contains all adapters (implementations) for the ports defined
//! in the application layer. Following hexagonal architecture:
//!
//! - **Driven Adapters (Outbound)**: Implement ports for external systems
//!   - `persistence/`: In-memory repositories, directory and seed loader
//!   - `gateway/`: Execution gateway client (reqwest) and scriptable mock
//!   - `webhook/`: Outbound webhook sender
//!
//! - **Driver Adapters (Inbound)**: Expose application to external world
//!   - `http/`: REST API controllers and the gateway callback endpoint
//!
//! - **Wiring**: `config/` holds the dependency injection container

pub mod config;
pub mod gateway;
pub mod http;
pub mod persistence;
pub mod webhook;
