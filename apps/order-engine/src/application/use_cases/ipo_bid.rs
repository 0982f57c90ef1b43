//! IPO Batch Bid Use Case
//!
//! One bid across several series becomes one order row per series, all
//! sharing a fresh `group_id`. Rows start in `PAYMENT_LINK_SENT` without
//! touching the gateway; they are placed when the customer confirms through
//! the consent URL.

use std::sync::Arc;

use futures::future::try_join_all;

use super::create_order::gateway_order_request;
use super::status_sync::{apply_entry, map_entries};
use crate::application::dto::{CancelIpoBidDto, CreateIpoBidDto, IpoBidDto, OrderDto, Session};
use crate::application::ports::{
    DirectoryPort, EventPublisherPort, ExecutionGatewayPort, ExternalStatusEntry,
};
use crate::domain::order_lifecycle::events::{
    CANCELLATION_UPDATED_EVENT, IPO_ORDER_PLACED_EVENT, PAYMENT_LINK_OPENED_EVENT,
};
use crate::domain::order_lifecycle::{
    CreateOrderCommand, Order, OrderRepository, OrderSagaStep, OrderStatus, ProductSnapshot,
    ProductType, TransitionMode,
};
use crate::domain::shared::{CustomerId, GroupId, OrderId, ProductId};
use crate::error::{EngineError, ErrorCode};
use crate::observability::{
    record_order_created, record_partial_failure, record_status_transition,
};

/// Use case for IPO batch bids.
pub struct IpoBidUseCase<G, O, D, E>
where
    G: ExecutionGatewayPort,
    O: OrderRepository,
    D: DirectoryPort,
    E: EventPublisherPort,
{
    gateway: Arc<G>,
    order_repo: Arc<O>,
    directory: Arc<D>,
    event_publisher: Arc<E>,
    consent_base_url: String,
    mode: TransitionMode,
}

impl<G, O, D, E> IpoBidUseCase<G, O, D, E>
where
    G: ExecutionGatewayPort,
    O: OrderRepository,
    D: DirectoryPort,
    E: EventPublisherPort,
{
    /// Create a new `IpoBidUseCase`.
    ///
    /// `mode` governs statuses taken from cancellation responses.
    pub fn new(
        gateway: Arc<G>,
        order_repo: Arc<O>,
        directory: Arc<D>,
        event_publisher: Arc<E>,
        consent_base_url: impl Into<String>,
        mode: TransitionMode,
    ) -> Self {
        Self {
            gateway,
            order_repo,
            directory,
            event_publisher,
            consent_base_url: consent_base_url.into().trim_end_matches('/').to_string(),
            mode,
        }
    }

    /// Create one row per series under a fresh group id.
    ///
    /// Every row is built and validated before the first write. Rows are
    /// then written one after another; a failed write rejects the call and
    /// leaves the rows already written in place.
    ///
    /// # Errors
    ///
    /// Validation and not found errors write nothing.
    pub async fn create(
        &self,
        session: &Session,
        dto: CreateIpoBidDto,
    ) -> Result<IpoBidDto, EngineError> {
        if dto.series.is_empty() {
            return Err(EngineError::validation("an IPO bid needs at least one series")
                .with_context("field", "series"));
        }

        let customer_id = CustomerId::new(&dto.customer_id);
        let customer = self.directory.find_customer(&customer_id).await?.ok_or_else(|| {
            EngineError::new(
                ErrorCode::CustomerNotFound,
                format!("Customer {customer_id} not found"),
            )
        })?;

        let mut products: Vec<ProductSnapshot> = Vec::with_capacity(dto.series.len());
        for series in &dto.series {
            let product_id = ProductId::new(&series.product_id);
            let product = self.directory.find_product(&product_id).await?.ok_or_else(|| {
                EngineError::new(
                    ErrorCode::ProductNotFound,
                    format!("Product {product_id} not found"),
                )
            })?;
            if product.product_type != ProductType::Ipo {
                return Err(EngineError::validation(format!(
                    "Product {product_id} is not an IPO series"
                ))
                .with_context("product_id", product_id.into_inner()));
            }
            products.push(product);
        }

        let group_id = GroupId::generate();
        let consent_url = self.consent_url(&group_id);
        let mut rows = Vec::with_capacity(products.len());

        for (series, product) in dto.series.iter().zip(products) {
            let mut order = Order::new(CreateOrderCommand {
                account_id: session.account_id.clone(),
                advisor_id: session.user_id.clone(),
                customer: customer.clone(),
                product,
                units: series.units,
                return_rate: series.return_rate,
                unit_price: series.bid_price,
                consent_given: dto.consent_given,
                group_id: Some(group_id.clone()),
            })?;
            order.set_payment_link(consent_url.clone());
            order.complete_step(OrderSagaStep::OrderPersisted);
            rows.push(order);
        }

        let mut orders = Vec::with_capacity(rows.len());
        for order in rows {
            self.order_repo.save(&order).await?;
            record_order_created("ipo");
            orders.push(OrderDto::from_order(&order));
        }

        tracing::info!(
            group_id = %group_id,
            account_id = %session.account_id,
            customer_id = %customer_id,
            series = orders.len(),
            "IPO bid created"
        );

        Ok(IpoBidDto {
            group_id: group_id.into_inner(),
            consent_url,
            orders,
        })
    }

    /// Load a bid. Reading it marks every `PAYMENT_LINK_SENT` row as
    /// `PAYMENT_LINK_OPENED`.
    ///
    /// # Errors
    ///
    /// `BID_NOT_FOUND` if the group has no rows in the session's account.
    pub async fn get(&self, session: &Session, group_id: &str) -> Result<IpoBidDto, EngineError> {
        let group_id = GroupId::new(group_id);
        let mut rows = self.load_group(session, &group_id).await?;

        for order in rows.iter_mut() {
            if order.status() != OrderStatus::PaymentLinkSent {
                continue;
            }
            order.apply_status(
                OrderStatus::PaymentLinkOpened,
                TransitionMode::Strict,
                PAYMENT_LINK_OPENED_EVENT,
            )?;
            self.order_repo.save(order).await?;
            record_status_transition(
                PAYMENT_LINK_OPENED_EVENT,
                OrderStatus::PaymentLinkOpened.as_str(),
            );
            self.publish(order).await;
            tracing::debug!(order_id = %order.id(), group_id = %group_id, "Payment link opened");
        }

        Ok(self.bid_dto(&group_id, &rows))
    }

    /// Consent callback: place every unplaced row with the gateway.
    ///
    /// The credential is refreshed once for the batch. Rows are placed one
    /// at a time; a failure stops the loop and leaves earlier rows placed.
    ///
    /// # Errors
    ///
    /// - `BID_NOT_FOUND` if the group is unknown
    /// - `PARTIAL_FAILURE` if some rows are placed and a later one failed
    /// - `GATEWAY_UNAVAILABLE` if nothing is placed
    pub async fn confirm(
        &self,
        session: &Session,
        group_id: &str,
    ) -> Result<IpoBidDto, EngineError> {
        let group_id = GroupId::new(group_id);
        let mut rows = self.load_group(session, &group_id).await?;

        let pending: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, o)| {
                !o.is_placed()
                    && matches!(
                        o.status(),
                        OrderStatus::PaymentLinkSent | OrderStatus::PaymentLinkOpened
                    )
            })
            .map(|(i, _)| i)
            .collect();

        if pending.is_empty() {
            return Ok(self.bid_dto(&group_id, &rows));
        }

        let customer_id = rows[pending[0]].customer().customer_id.clone();
        let token = match self.gateway.refresh_access_token(&customer_id).await {
            Ok(token) => token,
            Err(e) => {
                let err = EngineError::gateway(
                    ErrorCode::GatewayUnavailable,
                    "refresh_access_token",
                    &e,
                );
                return Err(stop_batch(&group_id, &rows, &rows[pending[0]], err));
            }
        };

        for index in pending {
            let request = gateway_order_request(&rows[index], token.clone());
            let ack = match self.gateway.create_order(&request).await {
                Ok(ack) => ack,
                Err(e) => {
                    let err =
                        EngineError::gateway(ErrorCode::GatewayUnavailable, "create_order", &e);
                    return Err(stop_batch(&group_id, &rows, &rows[index], err));
                }
            };

            let order = &mut rows[index];
            order.attach_gateway_order(ack.external_order_id, ack.foreign_id, ack.payload)?;
            order.apply_status(
                OrderStatus::OrderCreated,
                TransitionMode::Strict,
                IPO_ORDER_PLACED_EVENT,
            )?;
            order.complete_step(OrderSagaStep::GatewayOrderCreated);
            self.order_repo.save(order).await?;
            record_status_transition(IPO_ORDER_PLACED_EVENT, OrderStatus::OrderCreated.as_str());
            self.publish(order).await;

            tracing::info!(
                order_id = %order.id(),
                group_id = %group_id,
                external_order_id = ?order.external_order_id().map(ToString::to_string),
                "IPO series placed"
            );
        }

        Ok(self.bid_dto(&group_id, &rows))
    }

    /// Cancel the gateway order behind `payment_id` and apply every status
    /// in the gateway's response. Rows missing from the response keep their
    /// status.
    ///
    /// # Errors
    ///
    /// - `ORDER_NOT_FOUND` / validation if `payment_id` is not a placed row
    /// - `GATEWAY_UNAVAILABLE` if the gateway call fails
    /// - `UNKNOWN_EXTERNAL_STATUS` if any entry is outside the vocabulary;
    ///   no row is updated then
    pub async fn cancel(
        &self,
        session: &Session,
        payment_id: &str,
    ) -> Result<CancelIpoBidDto, EngineError> {
        let order = self
            .order_repo
            .find_by_id(&OrderId::new(payment_id))
            .await?
            .filter(|o| o.account_id() == &session.account_id)
            .ok_or_else(|| EngineError::order_not_found(payment_id))?;

        let Some(external_id) = order.external_order_id().cloned() else {
            return Err(EngineError::validation(format!(
                "Order {payment_id} has not been placed with the gateway"
            ))
            .with_context("order_id", payment_id));
        };

        let token = self
            .gateway
            .refresh_access_token(&order.customer().customer_id)
            .await
            .map_err(|e| {
                EngineError::gateway(ErrorCode::GatewayUnavailable, "refresh_access_token", &e)
            })?;
        let entries = self
            .gateway
            .cancel_order(&external_id, &token)
            .await
            .map_err(|e| EngineError::gateway(ErrorCode::GatewayUnavailable, "cancel_order", &e))?;

        let mapped = map_entries(entries)?;
        let results = try_join_all(
            mapped
                .into_iter()
                .map(|(entry, status)| self.apply_cancellation(session, entry, status)),
        )
        .await?;

        let mut updated = Vec::new();
        let mut unmatched = Vec::new();
        for result in results {
            match result {
                CancellationResult::Updated(dto) => updated.push(*dto),
                CancellationResult::Rejected => {}
                CancellationResult::Unmatched(id) => unmatched.push(id),
            }
        }

        tracing::info!(
            payment_id,
            external_order_id = %external_id,
            updated = updated.len(),
            unmatched = unmatched.len(),
            "IPO bid cancellation applied"
        );

        Ok(CancelIpoBidDto {
            payment_id: payment_id.to_string(),
            updated,
            unmatched,
        })
    }

    async fn apply_cancellation(
        &self,
        session: &Session,
        entry: ExternalStatusEntry,
        status: OrderStatus,
    ) -> Result<CancellationResult, EngineError> {
        let Some(mut order) = self
            .order_repo
            .find_by_external_id(&entry.order_id)
            .await?
            .filter(|o| o.account_id() == &session.account_id)
        else {
            tracing::warn!(external_order_id = %entry.order_id, "Cancellation entry matches no order");
            return Ok(CancellationResult::Unmatched(entry.order_id.into_inner()));
        };

        if !apply_entry(&mut order, &entry, status, self.mode, CANCELLATION_UPDATED_EVENT) {
            return Ok(CancellationResult::Rejected);
        }
        self.order_repo.save(&order).await?;
        self.publish(&mut order).await;
        Ok(CancellationResult::Updated(Box::new(OrderDto::from_order(&order))))
    }

    async fn load_group(
        &self,
        session: &Session,
        group_id: &GroupId,
    ) -> Result<Vec<Order>, EngineError> {
        let rows: Vec<Order> = self
            .order_repo
            .find_by_group(group_id)
            .await?
            .into_iter()
            .filter(|o| o.account_id() == &session.account_id)
            .collect();

        if rows.is_empty() {
            return Err(EngineError::new(
                ErrorCode::BidNotFound,
                format!("IPO bid {group_id} not found"),
            )
            .with_context("group_id", group_id.as_str()));
        }
        Ok(rows)
    }

    fn consent_url(&self, group_id: &GroupId) -> String {
        format!("{}/{group_id}", self.consent_base_url)
    }

    fn bid_dto(&self, group_id: &GroupId, rows: &[Order]) -> IpoBidDto {
        IpoBidDto {
            group_id: group_id.to_string(),
            consent_url: self.consent_url(group_id),
            orders: rows.iter().map(OrderDto::from_order).collect(),
        }
    }

    async fn publish(&self, order: &mut Order) {
        let events = order.drain_events();
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.event_publisher.publish_events(events).await {
            tracing::error!(order_id = %order.id(), error = %e, "Failed to publish order events");
        }
    }
}

/// Turn a gateway failure during confirmation into the caller's error.
fn stop_batch(
    group_id: &GroupId,
    rows: &[Order],
    failed: &Order,
    err: EngineError,
) -> EngineError {
    let placed = rows.iter().filter(|o| o.is_placed()).count();
    if placed == 0 {
        return err.with_context("group_id", group_id.as_str());
    }

    let last_step = failed
        .last_completed_step()
        .map_or_else(|| "NONE".to_string(), |s| s.to_string());
    tracing::warn!(
        group_id = %group_id,
        order_id = %failed.id(),
        placed,
        total = rows.len(),
        "IPO confirmation stopped part-way"
    );
    record_partial_failure("confirm_ipo_bid", &last_step);

    EngineError::partial_failure(
        failed.id().as_str(),
        &last_step,
        format!(
            "{placed} of {} series were placed before the execution gateway became unavailable; confirm again to continue",
            rows.len()
        ),
    )
    .with_context("group_id", group_id.as_str())
}

enum CancellationResult {
    Updated(Box<OrderDto>),
    Rejected,
    Unmatched(String),
}
