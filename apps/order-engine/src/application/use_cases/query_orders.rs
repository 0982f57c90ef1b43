//! Order queries, scoped to the session's account and hierarchy.

use std::sync::Arc;

use crate::application::dto::{OrderDto, Session};
use crate::application::ports::DirectoryPort;
use crate::application::services::ReporteeResolver;
use crate::domain::order_lifecycle::{OrderRepository, OrderStatus};
use crate::domain::shared::OrderId;
use crate::error::EngineError;

/// Use case for reading orders.
pub struct QueryOrdersUseCase<O, D>
where
    O: OrderRepository,
    D: DirectoryPort,
{
    order_repo: Arc<O>,
    reportees: ReporteeResolver<D>,
}

impl<O, D> QueryOrdersUseCase<O, D>
where
    O: OrderRepository,
    D: DirectoryPort,
{
    /// Create a new `QueryOrdersUseCase`.
    pub const fn new(order_repo: Arc<O>, directory: Arc<D>) -> Self {
        Self {
            order_repo,
            reportees: ReporteeResolver::new(directory),
        }
    }

    /// One order of the session's account.
    ///
    /// # Errors
    ///
    /// `ORDER_NOT_FOUND` if absent or owned by another account.
    pub async fn get(&self, session: &Session, order_id: &str) -> Result<OrderDto, EngineError> {
        self.order_repo
            .find_by_id(&OrderId::new(order_id))
            .await?
            .filter(|o| o.account_id() == &session.account_id)
            .map(|o| OrderDto::from_order(&o))
            .ok_or_else(|| EngineError::order_not_found(order_id))
    }

    /// Orders of the session's account placed by the session user or
    /// anyone below them in the hierarchy, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the repository or directory fails.
    pub async fn list(
        &self,
        session: &Session,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderDto>, EngineError> {
        let mut advisors = self.reportees.resolve(&session.user_id).await?;
        advisors.insert(session.user_id.clone());

        let orders = match status {
            Some(status) => {
                self.order_repo
                    .find_by_account_and_status(&session.account_id, status)
                    .await?
            }
            None => self.order_repo.find_by_account(&session.account_id).await?,
        };

        let visible: Vec<OrderDto> = orders
            .iter()
            .filter(|o| advisors.contains(o.advisor_id()))
            .map(OrderDto::from_order)
            .collect();

        tracing::debug!(
            account_id = %session.account_id,
            user_id = %session.user_id,
            advisors = advisors.len(),
            orders = visible.len(),
            "Listed orders"
        );
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::fixtures;
    use crate::domain::order_lifecycle::{CreateOrderCommand, Order, TransitionMode};
    use crate::domain::shared::{AccountId, CustomerId, ProductId, UserId};
    use crate::error::ErrorCode;
    use crate::infrastructure::persistence::{InMemoryDirectory, InMemoryOrderRepository};
    use rust_decimal_macros::dec;

    async fn order_for(
        directory: &InMemoryDirectory,
        repo: &InMemoryOrderRepository,
        account: &str,
        advisor: &str,
    ) -> Order {
        let customer = directory
            .find_customer(&CustomerId::new(fixtures::CUSTOMER))
            .await
            .unwrap()
            .unwrap();
        let product = directory
            .find_product(&ProductId::new(fixtures::BOND))
            .await
            .unwrap()
            .unwrap();
        let order = Order::new(CreateOrderCommand {
            account_id: AccountId::new(account),
            advisor_id: UserId::new(advisor),
            customer,
            product,
            units: 1,
            return_rate: dec!(9),
            unit_price: dec!(100),
            consent_given: true,
            group_id: None,
        })
        .unwrap();
        repo.save(&order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn list_includes_reportees_but_not_peers() {
        let directory = fixtures::directory();
        directory.add_reportee(UserId::new("adv-2"), UserId::new("adv-3"));
        let repo = Arc::new(InMemoryOrderRepository::new());

        let own = order_for(&directory, &repo, fixtures::ACCOUNT, fixtures::ADVISOR).await;
        let direct = order_for(&directory, &repo, fixtures::ACCOUNT, "adv-2").await;
        let indirect = order_for(&directory, &repo, fixtures::ACCOUNT, "adv-3").await;
        order_for(&directory, &repo, fixtures::ACCOUNT, "peer").await;
        order_for(&directory, &repo, "acct-2", fixtures::ADVISOR).await;

        let use_case = QueryOrdersUseCase::new(Arc::clone(&repo), directory);
        let listed = use_case.list(&fixtures::session(), None).await.unwrap();

        let ids: Vec<&str> = listed.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        for expected in [&own, &direct, &indirect] {
            assert!(ids.contains(&expected.id().as_str()));
        }
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let directory = fixtures::directory();
        let repo = Arc::new(InMemoryOrderRepository::new());

        let mut processed = order_for(&directory, &repo, fixtures::ACCOUNT, fixtures::ADVISOR).await;
        processed
            .apply_status(OrderStatus::OrderProcessed, TransitionMode::Compatibility, "orderProcessed")
            .unwrap();
        repo.save(&processed).await.unwrap();
        order_for(&directory, &repo, fixtures::ACCOUNT, fixtures::ADVISOR).await;

        let use_case = QueryOrdersUseCase::new(Arc::clone(&repo), directory);
        let listed = use_case
            .list(&fixtures::session(), Some(OrderStatus::OrderProcessed))
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, processed.id().as_str());
    }

    #[tokio::test]
    async fn get_hides_other_accounts() {
        let directory = fixtures::directory();
        let repo = Arc::new(InMemoryOrderRepository::new());
        let foreign = order_for(&directory, &repo, "acct-2", fixtures::ADVISOR).await;
        let own = order_for(&directory, &repo, fixtures::ACCOUNT, fixtures::ADVISOR).await;

        let use_case = QueryOrdersUseCase::new(Arc::clone(&repo), directory);

        let found = use_case.get(&fixtures::session(), own.id().as_str()).await.unwrap();
        assert_eq!(found.id, own.id().as_str());

        let err = use_case
            .get(&fixtures::session(), foreign.id().as_str())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrderNotFound);
    }
}
