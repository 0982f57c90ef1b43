//! Directory Port (Driven Port)
//!
//! Read access to reference data owned elsewhere: customers, products,
//! customer-account links and the manager hierarchy.

use async_trait::async_trait;

use crate::domain::order_lifecycle::value_objects::{CustomerSnapshot, ProductSnapshot};
use crate::domain::shared::{AccountId, CustomerId, ForeignId, ProductId, UserId};

/// Directory lookup error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    /// Backend unavailable.
    #[error("Directory unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for reference data lookups.
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    /// Customer by reference.
    async fn find_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerSnapshot>, DirectoryError>;

    /// Customer by the gateway's foreign reference.
    async fn find_customer_by_foreign_id(
        &self,
        foreign_id: &ForeignId,
    ) -> Result<Option<CustomerId>, DirectoryError>;

    /// Product by reference.
    async fn find_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductSnapshot>, DirectoryError>;

    /// Every account the customer is linked to.
    async fn linked_accounts(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<AccountId>, DirectoryError>;

    /// Users whose manager is `manager`.
    async fn direct_reportees(&self, manager: &UserId) -> Result<Vec<UserId>, DirectoryError>;
}
