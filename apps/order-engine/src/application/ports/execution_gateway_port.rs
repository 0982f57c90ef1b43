//! Execution Gateway Port (Driven Port)
//!
//! Interface to the partner system that prices, places, e-signs and
//! cancels orders.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{CustomerId, ExternalOrderId, ForeignId, OrderId, TransactionId};

/// Price quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRequest {
    /// Gateway product code.
    pub product_code: String,
    /// Units requested.
    pub units: u32,
    /// Requested return rate.
    pub return_rate: Decimal,
}

/// Price quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Price per unit.
    pub unit_price: Decimal,
    /// Total amount the customer pays.
    pub user_amount: Decimal,
}

/// Customer-scoped gateway credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Request to create an order at the gateway.
#[derive(Debug, Clone)]
pub struct GatewayOrderRequest {
    /// Customer credential from `refresh_access_token`.
    pub token: AccessToken,
    /// Local order id, sent as the client reference.
    pub reference: OrderId,
    /// Customer placing the order.
    pub customer_id: CustomerId,
    /// Customer demat account.
    pub demat_number: String,
    /// Gateway product code.
    pub product_code: String,
    /// ISIN.
    pub isin: String,
    /// Units.
    pub units: u32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Requested return rate.
    pub return_rate: Decimal,
}

/// Gateway acknowledgement of a created order.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOrderAck {
    /// Gateway order id.
    pub external_order_id: ExternalOrderId,
    /// Gateway foreign reference.
    pub foreign_id: Option<ForeignId>,
    /// Verbatim response payload.
    pub payload: serde_json::Value,
}

/// One `{orderId, status}` entry from cancellation or timeline responses.
///
/// `status` is kept raw; mapping to a local status happens in the use case
/// so unknown values can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalStatusEntry {
    /// Gateway order id.
    pub order_id: ExternalOrderId,
    /// Raw external status.
    pub status: String,
    /// Settlement reference, when the gateway has one.
    pub transaction_id: Option<TransactionId>,
}

/// Execution gateway error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Transport failure (connect, TLS, DNS).
    #[error("Gateway connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Request timed out.
    #[error("Gateway request timed out")]
    Timeout,

    /// Gateway answered `success: false` or a 4xx.
    #[error("Gateway rejected request: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// Rate limited.
    #[error("Rate limited by gateway")]
    RateLimited,

    /// Response could not be decoded.
    #[error("Invalid gateway response: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },

    /// Unknown error.
    #[error("Gateway error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

/// Port for execution gateway interactions.
#[async_trait]
pub trait ExecutionGatewayPort: Send + Sync {
    /// Quote a price for `units` at `return_rate`.
    async fn get_price(&self, request: &PriceRequest) -> Result<PriceQuote, GatewayError>;

    /// Obtain a fresh credential for the customer.
    async fn refresh_access_token(
        &self,
        customer_id: &CustomerId,
    ) -> Result<AccessToken, GatewayError>;

    /// Create the order at the gateway. Not idempotent.
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrderAck, GatewayError>;

    /// Request an e-signing URL for a placed order.
    async fn get_esigning_url(
        &self,
        order_id: &ExternalOrderId,
        pan: &str,
        email: &str,
    ) -> Result<String, GatewayError>;

    /// Cancel a placed order; returns per-series results.
    async fn cancel_order(
        &self,
        order_id: &ExternalOrderId,
        token: &AccessToken,
    ) -> Result<Vec<ExternalStatusEntry>, GatewayError>;

    /// Transaction timeline for a product.
    async fn get_transaction_timeline(
        &self,
        product_code: &str,
        token: &AccessToken,
    ) -> Result<Vec<ExternalStatusEntry>, GatewayError>;
}
