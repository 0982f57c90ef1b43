//! IPO batch bid DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderDto;

/// One series of a multi-series IPO bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpoSeriesDto {
    /// Product reference of the series.
    pub product_id: String,
    /// Units bid.
    pub units: u32,
    /// Bid price per unit.
    pub bid_price: Decimal,
    /// Coupon / return rate of the series.
    #[serde(default)]
    pub return_rate: Decimal,
}

/// DTO for creating an IPO bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIpoBidDto {
    /// Customer reference.
    pub customer_id: String,
    /// Series, processed in order.
    pub series: Vec<IpoSeriesDto>,
    /// Customer consent captured by the advisor.
    #[serde(default)]
    pub consent_given: bool,
}

/// An IPO batch and its rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpoBidDto {
    /// Batch correlation key.
    pub group_id: String,
    /// Consent URL for the customer.
    pub consent_url: String,
    /// Rows, oldest first.
    pub orders: Vec<OrderDto>,
}

/// Result of cancelling an IPO bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelIpoBidDto {
    /// Local order id the cancellation was requested for.
    pub payment_id: String,
    /// Rows whose status came from the cancellation response.
    pub updated: Vec<OrderDto>,
    /// Response entries that matched no local row.
    pub unmatched: Vec<String>,
}
