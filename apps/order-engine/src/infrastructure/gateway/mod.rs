//! Execution Gateway Adapters
//!
//! JSON/HTTP client for the partner execution venue, plus a scriptable
//! in-process mock:
//! - `x-api-key` on every call, bearer token on customer-scoped calls
//! - Retry with exponential backoff for transport errors and 408/429/5xx
//! - `success: false` bodies surface as rejections

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;
mod mock;

pub use adapter::HttpExecutionGateway;
pub use config::ExecutionGatewayConfig;
pub use error::GatewayClientError;
pub use mock::{MockExecutionGateway, MockOperation};
