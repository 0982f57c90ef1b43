//! Gateway API request and response types.
//!
//! Every response body carries `success`; the remaining fields are read
//! only after the client has checked it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::{ExternalStatusEntry, PriceQuote};
use crate::domain::shared::{ExternalOrderId, TransactionId};

// ============================================================================
// Requests
// ============================================================================

/// Price quote request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequestBody<'a> {
    /// Product code.
    pub product_code: &'a str,
    /// Units.
    pub units: u32,
    /// Requested return rate.
    pub return_rate: Decimal,
}

/// Order placement request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody<'a> {
    /// Local order id, echoed back by the gateway.
    pub reference_id: &'a str,
    /// Customer reference.
    pub customer_id: &'a str,
    /// Demat account number.
    pub demat_number: &'a str,
    /// Product code.
    pub product_code: &'a str,
    /// ISIN.
    pub isin: &'a str,
    /// Units.
    pub units: u32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Return rate.
    pub return_rate: Decimal,
}

/// E-sign link request.
#[derive(Debug, Clone, Serialize)]
pub struct EsignBody<'a> {
    /// Signer PAN.
    pub pan: &'a str,
    /// Signer email.
    pub email: &'a str,
}

// ============================================================================
// Responses
// ============================================================================

/// Price quote response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    /// Price per unit.
    pub unit_price: Decimal,
    /// Total for the requested units.
    pub user_amount: Decimal,
}

impl From<PriceResponse> for PriceQuote {
    fn from(response: PriceResponse) -> Self {
        Self {
            unit_price: response.unit_price,
            user_amount: response.user_amount,
        }
    }
}

/// Access token response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Bearer token for customer-scoped calls.
    pub access_token: String,
}

/// Order placement response. The full body is also kept verbatim.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Gateway order id.
    pub order_id: String,
    /// Gateway customer reference.
    #[serde(default)]
    pub foreign_id: Option<String>,
}

/// E-sign link response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsignResponse {
    /// URL the customer signs at.
    pub signing_url: String,
}

/// One order in a cancellation or timeline response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusItem {
    /// Gateway order id.
    pub order_id: String,
    /// Raw gateway status string.
    pub status: String,
    /// Settlement reference.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl From<OrderStatusItem> for ExternalStatusEntry {
    fn from(item: OrderStatusItem) -> Self {
        Self {
            order_id: ExternalOrderId::new(item.order_id),
            status: item.status,
            transaction_id: item.transaction_id.map(TransactionId::new),
        }
    }
}

/// Cancellation or timeline response.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusListResponse {
    /// Affected orders.
    #[serde(default)]
    pub orders: Vec<OrderStatusItem>,
}
