//! In-memory directory of customers, products, account links and the
//! manager hierarchy.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::ports::{DirectoryError, DirectoryPort};
use crate::domain::order_lifecycle::{CustomerSnapshot, ProductSnapshot};
use crate::domain::shared::{AccountId, CustomerId, ForeignId, ProductId, UserId};

#[derive(Debug, Default)]
struct DirectoryData {
    customers: HashMap<CustomerId, CustomerSnapshot>,
    foreign_ids: HashMap<ForeignId, CustomerId>,
    products: HashMap<ProductId, ProductSnapshot>,
    accounts: HashMap<CustomerId, Vec<AccountId>>,
    reportees: HashMap<UserId, Vec<UserId>>,
}

/// In-memory implementation of `DirectoryPort`.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    data: RwLock<DirectoryData>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a customer, optionally with the gateway's reference for it.
    pub fn add_customer(&self, customer: CustomerSnapshot, foreign_id: Option<ForeignId>) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(foreign_id) = foreign_id {
            data.foreign_ids
                .insert(foreign_id, customer.customer_id.clone());
        }
        data.customers
            .insert(customer.customer_id.clone(), customer);
    }

    /// Register a product.
    pub fn add_product(&self, product: ProductSnapshot) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .insert(product.product_id.clone(), product);
    }

    /// Link a customer to an account. Linking twice is a no-op.
    pub fn link_account(&self, customer_id: CustomerId, account_id: AccountId) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let linked = data.accounts.entry(customer_id).or_default();
        if !linked.contains(&account_id) {
            linked.push(account_id);
        }
    }

    /// Record `reportee` as reporting directly to `manager`.
    pub fn add_reportee(&self, manager: UserId, reportee: UserId) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let direct = data.reportees.entry(manager).or_default();
        if !direct.contains(&reportee) {
            direct.push(reportee);
        }
    }
}

#[async_trait]
impl DirectoryPort for InMemoryDirectory {
    async fn find_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<CustomerSnapshot>, DirectoryError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.customers.get(customer_id).cloned())
    }

    async fn find_customer_by_foreign_id(
        &self,
        foreign_id: &ForeignId,
    ) -> Result<Option<CustomerId>, DirectoryError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.foreign_ids.get(foreign_id).cloned())
    }

    async fn find_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductSnapshot>, DirectoryError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.products.get(product_id).cloned())
    }

    async fn linked_accounts(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<AccountId>, DirectoryError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.accounts.get(customer_id).cloned().unwrap_or_default())
    }

    async fn direct_reportees(&self, manager: &UserId) -> Result<Vec<UserId>, DirectoryError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.reportees.get(manager).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str) -> CustomerSnapshot {
        CustomerSnapshot {
            customer_id: CustomerId::new(id),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            demat_number: "IN3000001".to_string(),
            pan: "ABCDE1234F".to_string(),
        }
    }

    #[tokio::test]
    async fn resolves_customer_by_foreign_id() {
        let directory = InMemoryDirectory::new();
        directory.add_customer(customer("cust-1"), Some(ForeignId::new("GW-77")));

        let found = directory
            .find_customer_by_foreign_id(&ForeignId::new("GW-77"))
            .await
            .unwrap();
        assert_eq!(found, Some(CustomerId::new("cust-1")));
        assert!(
            directory
                .find_customer_by_foreign_id(&ForeignId::new("GW-00"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn linking_is_idempotent() {
        let directory = InMemoryDirectory::new();
        let cust = CustomerId::new("cust-1");
        directory.link_account(cust.clone(), AccountId::new("a1"));
        directory.link_account(cust.clone(), AccountId::new("a1"));
        directory.link_account(cust.clone(), AccountId::new("a2"));

        let linked = directory.linked_accounts(&cust).await.unwrap();
        assert_eq!(linked, vec![AccountId::new("a1"), AccountId::new("a2")]);
    }

    #[tokio::test]
    async fn unknown_manager_has_no_reportees() {
        let directory = InMemoryDirectory::new();
        assert!(
            directory
                .direct_reportees(&UserId::new("nobody"))
                .await
                .unwrap()
                .is_empty()
        );
    }
}
