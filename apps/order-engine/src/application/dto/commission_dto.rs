//! Commission DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::value_objects::ProductType;

/// Commission for one processed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionLineDto {
    /// Local order id.
    pub order_id: String,
    /// Product reference.
    pub product_id: String,
    /// Product type.
    pub product_type: ProductType,
    /// Order amount.
    pub user_amount: Decimal,
    /// Spread applied (percent).
    pub spread: Decimal,
    /// `user_amount × spread / 100`.
    pub commission: Decimal,
}

/// Commission total with per-order breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSummaryDto {
    /// Account the orders belong to.
    pub account_id: String,
    /// Advisor, for the advisor projection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisor_id: Option<String>,
    /// Sum of `commission` over `orders`.
    pub total: Decimal,
    /// Breakdown.
    pub orders: Vec<CommissionLineDto>,
}
