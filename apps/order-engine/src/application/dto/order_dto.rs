//! Order DTOs
//!
//! `OrderDto` is the external order shape existing clients read: ids are
//! strings, decimals are strings, the creation time is `created_on` and the
//! signing URL is `payment_link`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::aggregate::Order;
use crate::domain::order_lifecycle::value_objects::{OrderSagaStep, OrderStatus, ProductType};
use crate::domain::shared::Timestamp;

/// DTO for creating a single order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderDto {
    /// Customer reference.
    pub customer_id: String,
    /// Product reference.
    pub product_id: String,
    /// Units.
    pub units: u32,
    /// Requested return rate.
    pub return_rate: Decimal,
    /// Customer consent captured by the advisor.
    #[serde(default)]
    pub consent_given: bool,
}

/// DTO representing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDto {
    /// Local id.
    pub id: String,
    /// Gateway order id.
    pub order_id: Option<String>,
    /// Gateway foreign id.
    pub foreign_id: Option<String>,
    /// Settlement transaction id.
    pub transaction_id: Option<String>,
    /// Status.
    pub status: OrderStatus,
    /// Units.
    pub units: u32,
    /// Return rate.
    pub return_rate: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Amount payable.
    pub user_amount: Decimal,
    /// Product reference.
    pub product_id: String,
    /// Product code.
    pub product_code: String,
    /// ISIN.
    pub isin: String,
    /// Product type.
    pub product_type: ProductType,
    /// Issuer.
    pub issuer: String,
    /// Customer reference.
    pub customer_id: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// Demat number.
    pub demat_number: String,
    /// Owning account.
    pub account_id: String,
    /// Advisor.
    pub advisor_id: String,
    /// IPO batch group.
    pub group_id: Option<String>,
    /// Signing URL.
    pub payment_link: Option<String>,
    /// Consent flag.
    pub consent_given: bool,
    /// Saga marker.
    pub last_completed_step: Option<OrderSagaStep>,
    /// Last gateway payload.
    pub metadata: Option<serde_json::Value>,
    /// Created at.
    pub created_on: Timestamp,
    /// Updated at.
    pub updated_at: Timestamp,
}

impl OrderDto {
    /// Create from domain Order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        let product = order.product();
        let customer = order.customer();
        Self {
            id: order.id().to_string(),
            order_id: order.external_order_id().map(ToString::to_string),
            foreign_id: order.foreign_id().map(ToString::to_string),
            transaction_id: order.transaction_id().map(ToString::to_string),
            status: order.status(),
            units: order.units(),
            return_rate: order.return_rate(),
            unit_price: order.unit_price(),
            user_amount: order.user_amount(),
            product_id: product.product_id.to_string(),
            product_code: product.code.clone(),
            isin: product.isin.clone(),
            product_type: product.product_type,
            issuer: product.issuer.clone(),
            customer_id: customer.customer_id.to_string(),
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            demat_number: customer.demat_number.clone(),
            account_id: order.account_id().to_string(),
            advisor_id: order.advisor_id().to_string(),
            group_id: order.group_id().map(ToString::to_string),
            payment_link: order.payment_link().map(str::to_string),
            consent_given: order.consent_given(),
            last_completed_step: order.last_completed_step(),
            metadata: order.metadata().cloned(),
            created_on: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}
