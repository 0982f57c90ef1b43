//! Order Repository Trait
//!
//! Persistence abstraction for order rows. Writers are last-write-wins;
//! there is no optimistic locking.

use async_trait::async_trait;

use super::aggregate::Order;
use super::errors::OrderError;
use super::value_objects::OrderStatus;
use crate::domain::shared::{AccountId, ExternalOrderId, GroupId, OrderId};

/// Repository trait for Order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Save an order (insert or update).
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn save(&self, order: &Order) -> Result<(), OrderError>;

    /// Find an order by its local id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError>;

    /// Find an order by the gateway-assigned order id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalOrderId,
    ) -> Result<Option<Order>, OrderError>;

    /// All rows of one IPO batch, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<Order>, OrderError>;

    /// All orders of an account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_account(&self, account_id: &AccountId) -> Result<Vec<Order>, OrderError>;

    /// Orders of an account in one status.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_account_and_status(
        &self,
        account_id: &AccountId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, OrderError>;

    /// Orders not yet in a terminal status that have a gateway order id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_active_placed(&self) -> Result<Vec<Order>, OrderError>;
}
