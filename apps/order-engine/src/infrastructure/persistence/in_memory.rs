//! In-memory repositories.
//!
//! Back the binary when no database is configured and every test that needs
//! a repository. Rows are cloned in and out; concurrent writers to the same
//! order are last-write-wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::commission::{RateCap, RateCapError, RateCapOwner, RateCapRepository};
use crate::domain::order_lifecycle::{Order, OrderError, OrderRepository, OrderStatus};
use crate::domain::shared::{AccountId, ExternalOrderId, GroupId, OrderId, ProductId};
use crate::domain::subscriptions::{
    SubscriptionError, SubscriptionRepository, WebhookSubscription,
};

// ============================================================================
// Orders
// ============================================================================

/// In-memory implementation of `OrderRepository`.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no order is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, predicate: impl Fn(&Order) -> bool) -> Vec<Order> {
        let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
        let mut selected: Vec<Order> = orders.values().filter(|o| predicate(o)).cloned().collect();
        selected.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        selected
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), OrderError> {
        let mut stored = order.clone();
        stored.drain_events();
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order.id().clone(), stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self
            .orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalOrderId,
    ) -> Result<Option<Order>, OrderError> {
        Ok(self
            .select(|o| o.external_order_id() == Some(external_id))
            .into_iter()
            .next())
    }

    async fn find_by_group(&self, group_id: &GroupId) -> Result<Vec<Order>, OrderError> {
        Ok(self.select(|o| o.group_id() == Some(group_id)))
    }

    async fn find_by_account(&self, account_id: &AccountId) -> Result<Vec<Order>, OrderError> {
        Ok(self.select(|o| o.account_id() == account_id))
    }

    async fn find_by_account_and_status(
        &self,
        account_id: &AccountId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(self.select(|o| o.account_id() == account_id && o.status() == status))
    }

    async fn find_active_placed(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.select(|o| o.is_placed() && !o.status().is_terminal()))
    }
}

// ============================================================================
// Rate caps
// ============================================================================

/// In-memory implementation of `RateCapRepository`.
#[derive(Debug, Default)]
pub struct InMemoryRateCapRepository {
    caps: RwLock<HashMap<(ProductId, RateCapOwner), RateCap>>,
}

impl InMemoryRateCapRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the cap for its (product, owner) pair.
    pub fn upsert(&self, cap: RateCap) {
        self.caps
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((cap.product_id.clone(), cap.owner.clone()), cap);
    }
}

#[async_trait]
impl RateCapRepository for InMemoryRateCapRepository {
    async fn find(
        &self,
        product_id: &ProductId,
        owner: &RateCapOwner,
    ) -> Result<Option<RateCap>, RateCapError> {
        Ok(self
            .caps
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(product_id.clone(), owner.clone()))
            .cloned())
    }
}

// ============================================================================
// Webhook subscriptions
// ============================================================================

/// In-memory implementation of `SubscriptionRepository`.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<AccountId, WebhookSubscription>>,
}

impl InMemorySubscriptionRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn upsert(&self, subscription: &WebhookSubscription) -> Result<(), SubscriptionError> {
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subscription.account_id().clone(), subscription.clone());
        Ok(())
    }

    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<WebhookSubscription>, SubscriptionError> {
        Ok(self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_lifecycle::{
        CreateOrderCommand, CustomerSnapshot, ProductSnapshot, ProductType, TransitionMode,
    };
    use crate::domain::shared::{CustomerId, UserId};
    use crate::domain::subscriptions::DeliveryMethod;
    use rust_decimal_macros::dec;

    fn create_test_order(account: &str, group: Option<&str>) -> Order {
        Order::new(CreateOrderCommand {
            account_id: AccountId::new(account),
            advisor_id: UserId::new("adv-1"),
            customer: CustomerSnapshot {
                customer_id: CustomerId::new("cust-1"),
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                demat_number: "IN3000001".to_string(),
                pan: "ABCDE1234F".to_string(),
            },
            product: ProductSnapshot {
                product_id: ProductId::new("prod-1"),
                code: "BOND-9".to_string(),
                isin: "INE000A01".to_string(),
                product_type: ProductType::Bond,
                issuer: "Acme Finance".to_string(),
            },
            units: 10,
            return_rate: dec!(9.5),
            unit_price: dec!(1000),
            consent_given: true,
            group_id: group.map(GroupId::new),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn save_and_find_by_id() {
        let repo = InMemoryOrderRepository::new();
        let order = create_test_order("acct-1", None);

        repo.save(&order).await.unwrap();

        let found = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(found.user_amount(), dec!(10000));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn save_does_not_persist_pending_events() {
        let repo = InMemoryOrderRepository::new();
        let mut order = create_test_order("acct-1", None);
        order
            .apply_status(OrderStatus::DigioDocOpened, TransitionMode::Strict, "documentOpened")
            .unwrap();

        repo.save(&order).await.unwrap();

        let found = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert!(found.pending_events().is_empty());
        assert_eq!(order.pending_events().len(), 1);
    }

    #[tokio::test]
    async fn find_by_external_id() {
        let repo = InMemoryOrderRepository::new();
        let mut order = create_test_order("acct-1", None);
        order
            .attach_gateway_order(ExternalOrderId::new("EXT-1"), None, serde_json::json!({}))
            .unwrap();
        repo.save(&order).await.unwrap();

        let found = repo
            .find_by_external_id(&ExternalOrderId::new("EXT-1"))
            .await
            .unwrap();
        assert_eq!(found.unwrap().id(), order.id());
        assert!(
            repo.find_by_external_id(&ExternalOrderId::new("UNKNOWN"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn find_by_group_and_account() {
        let repo = InMemoryOrderRepository::new();
        repo.save(&create_test_order("acct-1", Some("grp-1"))).await.unwrap();
        repo.save(&create_test_order("acct-1", Some("grp-1"))).await.unwrap();
        repo.save(&create_test_order("acct-2", None)).await.unwrap();

        assert_eq!(repo.find_by_group(&GroupId::new("grp-1")).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_account(&AccountId::new("acct-1")).await.unwrap().len(), 2);
        assert_eq!(
            repo.find_by_account_and_status(&AccountId::new("acct-2"), OrderStatus::OrderInitiated)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn active_placed_excludes_unplaced_and_terminal() {
        let repo = InMemoryOrderRepository::new();

        let unplaced = create_test_order("acct-1", None);
        repo.save(&unplaced).await.unwrap();

        let mut placed = create_test_order("acct-1", None);
        placed
            .attach_gateway_order(ExternalOrderId::new("EXT-1"), None, serde_json::json!({}))
            .unwrap();
        repo.save(&placed).await.unwrap();

        let mut done = create_test_order("acct-1", None);
        done.attach_gateway_order(ExternalOrderId::new("EXT-2"), None, serde_json::json!({}))
            .unwrap();
        done.apply_status(OrderStatus::OrderProcessed, TransitionMode::Compatibility, "orderProcessed")
            .unwrap();
        repo.save(&done).await.unwrap();

        let active = repo.find_active_placed().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), placed.id());
    }

    #[tokio::test]
    async fn rate_cap_lookup_by_owner() {
        let repo = InMemoryRateCapRepository::new();
        repo.upsert(RateCap {
            product_id: ProductId::new("prod-1"),
            owner: RateCapOwner::Account(AccountId::new("acct-1")),
            max_return_rate: dec!(11),
            min_price_deviation: dec!(-1),
            max_price_deviation: dec!(1),
        });

        let found = repo
            .find(&ProductId::new("prod-1"), &RateCapOwner::Account(AccountId::new("acct-1")))
            .await
            .unwrap();
        assert_eq!(found.unwrap().max_return_rate, dec!(11));

        let other_owner = repo
            .find(&ProductId::new("prod-1"), &RateCapOwner::User(UserId::new("acct-1")))
            .await
            .unwrap();
        assert!(other_owner.is_none());
    }

    #[tokio::test]
    async fn subscription_upsert_replaces_previous() {
        let repo = InMemorySubscriptionRepository::new();
        let account = AccountId::new("acct-1");

        let first = WebhookSubscription::new(
            account.clone(),
            "https://one.test/hook",
            DeliveryMethod::Post,
            vec!["orderProcessed".to_string()],
        )
        .unwrap();
        let second = WebhookSubscription::new(
            account.clone(),
            "https://two.test/hook",
            DeliveryMethod::Put,
            vec!["orderRejected".to_string()],
        )
        .unwrap();

        repo.upsert(&first).await.unwrap();
        repo.upsert(&second).await.unwrap();

        let found = repo.find_by_account(&account).await.unwrap().unwrap();
        assert_eq!(found.url(), "https://two.test/hook");
        assert!(!found.subscribes_to("orderProcessed"));
    }
}
