//! Calculate Commission Use Case
//!
//! Read-time commission over an account's `ORDER_PROCESSED` orders. Rate
//! caps are looked up per order concurrently; one failed lookup fails the
//! whole projection. Nothing is stored.

use std::sync::Arc;

use futures::future::{try_join, try_join_all};
use rust_decimal::Decimal;

use crate::application::dto::{CommissionLineDto, CommissionSummaryDto, Session};
use crate::domain::commission::{RateCapError, RateCapOwner, RateCapRepository, SpreadCalculator};
use crate::domain::order_lifecycle::{Order, OrderRepository, OrderStatus};
use crate::domain::shared::ProductId;
use crate::error::EngineError;

/// Use case for account and advisor commission.
pub struct CalculateCommissionUseCase<O, R>
where
    O: OrderRepository,
    R: RateCapRepository,
{
    order_repo: Arc<O>,
    rate_caps: Arc<R>,
}

impl<O, R> CalculateCommissionUseCase<O, R>
where
    O: OrderRepository,
    R: RateCapRepository,
{
    /// Create a new `CalculateCommissionUseCase`.
    pub const fn new(order_repo: Arc<O>, rate_caps: Arc<R>) -> Self {
        Self {
            order_repo,
            rate_caps,
        }
    }

    /// Account commission: the account cap against each order's rate.
    ///
    /// # Errors
    ///
    /// Returns error if an order or rate cap lookup fails.
    pub async fn account(&self, session: &Session) -> Result<CommissionSummaryDto, EngineError> {
        let orders = self.processed_orders(session).await?;

        let lines = try_join_all(orders.iter().map(|order| async move {
            let cap = self.account_cap(session, &order.product().product_id).await?;
            let spread = SpreadCalculator::account_spread(
                order.product().product_type,
                cap,
                order.return_rate(),
            );
            line(order, spread)
        }))
        .await?;

        let summary = summarize(session, None, lines)?;
        tracing::debug!(
            account_id = %session.account_id,
            orders = summary.orders.len(),
            total = %summary.total,
            "Account commission calculated"
        );
        Ok(summary)
    }

    /// Advisor commission: the account cap against the session user's own
    /// cap, over the orders that user placed.
    ///
    /// # Errors
    ///
    /// Returns error if an order or rate cap lookup fails.
    pub async fn advisor(&self, session: &Session) -> Result<CommissionSummaryDto, EngineError> {
        let orders: Vec<Order> = self
            .processed_orders(session)
            .await?
            .into_iter()
            .filter(|o| o.advisor_id() == &session.user_id)
            .collect();

        let user = RateCapOwner::User(session.user_id.clone());
        let lines = try_join_all(orders.iter().map(|order| {
            let user = &user;
            async move {
                let product_id = &order.product().product_id;
                let (account_cap, advisor_cap) = try_join(
                    self.account_cap(session, product_id),
                    self.cap(product_id, user),
                )
                .await?;
                let spread = SpreadCalculator::advisor_spread(account_cap, advisor_cap);
                line(order, spread)
            }
        }))
        .await?;

        let summary = summarize(session, Some(session.user_id.to_string()), lines)?;
        tracing::debug!(
            account_id = %session.account_id,
            user_id = %session.user_id,
            orders = summary.orders.len(),
            total = %summary.total,
            "Advisor commission calculated"
        );
        Ok(summary)
    }

    async fn processed_orders(&self, session: &Session) -> Result<Vec<Order>, EngineError> {
        Ok(self
            .order_repo
            .find_by_account_and_status(&session.account_id, OrderStatus::OrderProcessed)
            .await?)
    }

    async fn account_cap(
        &self,
        session: &Session,
        product_id: &ProductId,
    ) -> Result<Option<Decimal>, RateCapError> {
        self.cap(product_id, &RateCapOwner::Account(session.account_id.clone()))
            .await
    }

    async fn cap(
        &self,
        product_id: &ProductId,
        owner: &RateCapOwner,
    ) -> Result<Option<Decimal>, RateCapError> {
        Ok(self
            .rate_caps
            .find(product_id, owner)
            .await?
            .map(|cap| cap.max_return_rate))
    }
}

fn line(order: &Order, spread: Decimal) -> Result<CommissionLineDto, EngineError> {
    let commission = SpreadCalculator::commission(order.user_amount(), spread)
        .ok_or_else(|| out_of_range(order.id().as_str()))?;
    Ok(CommissionLineDto {
        order_id: order.id().to_string(),
        product_id: order.product().product_id.to_string(),
        product_type: order.product().product_type,
        user_amount: order.user_amount(),
        spread,
        commission,
    })
}

fn summarize(
    session: &Session,
    advisor_id: Option<String>,
    orders: Vec<CommissionLineDto>,
) -> Result<CommissionSummaryDto, EngineError> {
    let total = orders
        .iter()
        .try_fold(Decimal::ZERO, |total, l| total.checked_add(l.commission))
        .ok_or_else(|| out_of_range("total"))?;
    Ok(CommissionSummaryDto {
        account_id: session.account_id.to_string(),
        advisor_id,
        total,
        orders,
    })
}

fn out_of_range(what: &str) -> EngineError {
    EngineError::internal(format!("commission for {what} is out of range"))
}
