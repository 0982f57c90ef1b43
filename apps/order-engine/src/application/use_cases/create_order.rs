//! Create Order Use Case
//!
//! Single-order creation as a saga. The steps run strictly in order and
//! each one is persisted as the row's `last_completed_step`:
//!
//! 1. `ORDER_PERSISTED`: price quoted, row written in `ORDER_INITIATED`
//! 2. `CREDENTIAL_REFRESHED`: customer gateway credential refreshed
//! 3. `GATEWAY_ORDER_CREATED`: gateway ids attached, status `DIGIO_DOC_OPENED`
//! 4. `SIGNING_LINK_ISSUED`: e-sign link stored on the row
//!
//! A failure after step 1 leaves the row where it stopped (no rollback) and
//! returns a partial failure. `resume` continues from the marker, skipping
//! steps whose effect is already on the row.

use std::sync::Arc;

use crate::application::dto::{CreateOrderDto, OrderDto, Session};
use crate::application::ports::{
    DirectoryPort, EventPublisherPort, ExecutionGatewayPort, GatewayError, GatewayOrderRequest,
    PriceRequest,
};
use crate::domain::order_lifecycle::events::DOCUMENT_OPENED_EVENT;
use crate::domain::order_lifecycle::{
    CreateOrderCommand, CustomerSnapshot, Order, OrderRepository, OrderSagaStep, OrderStatus,
    ProductSnapshot, TransitionMode,
};
use crate::domain::shared::{CustomerId, OrderId, ProductId};
use crate::error::{EngineError, ErrorCode};
use crate::observability::{
    record_order_created, record_partial_failure, record_status_transition,
};

/// Use case for creating and resuming single orders.
pub struct CreateOrderUseCase<G, O, D, E>
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
}

impl<G, O, D, E> CreateOrderUseCase<G, O, D, E>
where
    G: ExecutionGatewayPort,
    O: OrderRepository,
    D: DirectoryPort,
    E: EventPublisherPort,
{
    /// Create a new `CreateOrderUseCase`.
    pub const fn new(
        gateway: Arc<G>,
        order_repo: Arc<O>,
        directory: Arc<D>,
        event_publisher: Arc<E>,
    ) -> Self {
        Self {
            gateway,
            order_repo,
            directory,
            event_publisher,
        }
    }

    /// Create an order. Not idempotent: every call writes a new row.
    ///
    /// # Errors
    ///
    /// - Validation / not found: nothing written
    /// - `PRICE_UNAVAILABLE`: quote failed, nothing written
    /// - `PARTIAL_FAILURE`: row written, a later step failed
    pub async fn execute(
        &self,
        session: &Session,
        dto: CreateOrderDto,
    ) -> Result<OrderDto, EngineError> {
        if dto.units == 0 {
            return Err(EngineError::new(
                ErrorCode::InvalidOrderParams,
                "units must be greater than zero",
            )
            .with_context("field", "units"));
        }
        if dto.return_rate.is_sign_negative() {
            return Err(EngineError::new(
                ErrorCode::InvalidOrderParams,
                "return rate cannot be negative",
            )
            .with_context("field", "return_rate"));
        }

        let customer = self.resolve_customer(&CustomerId::new(&dto.customer_id)).await?;
        let product = self.resolve_product(&ProductId::new(&dto.product_id)).await?;

        // 1. Quote
        let quote = self
            .gateway
            .get_price(&PriceRequest {
                product_code: product.code.clone(),
                units: dto.units,
                return_rate: dto.return_rate,
            })
            .await
            .map_err(|e| EngineError::gateway(ErrorCode::PriceUnavailable, "get_price", &e))?;

        // 2. Persist
        let mut order = Order::new(CreateOrderCommand {
            account_id: session.account_id.clone(),
            advisor_id: session.user_id.clone(),
            customer,
            product,
            units: dto.units,
            return_rate: dto.return_rate,
            unit_price: quote.unit_price,
            consent_given: dto.consent_given,
            group_id: None,
        })?;
        if quote.user_amount != order.user_amount() {
            tracing::warn!(
                product_code = %order.product().code,
                units = order.units(),
                unit_price = %quote.unit_price,
                quoted_amount = %quote.user_amount,
                user_amount = %order.user_amount(),
                "Quoted amount differs from units times unit price"
            );
        }
        order.complete_step(OrderSagaStep::OrderPersisted);
        self.order_repo.save(&order).await?;
        record_order_created("single");

        tracing::info!(
            order_id = %order.id(),
            account_id = %order.account_id(),
            product_code = %order.product().code,
            units = order.units(),
            user_amount = %order.user_amount(),
            "Order persisted"
        );

        // 3-6. Gateway steps
        self.continue_saga(&mut order).await?;
        Ok(OrderDto::from_order(&order))
    }

    /// Continue an interrupted creation from its saga marker.
    ///
    /// A fully created order is returned unchanged.
    ///
    /// # Errors
    ///
    /// `ORDER_NOT_FOUND` if the order is absent or belongs to another
    /// account; `PARTIAL_FAILURE` if a step fails again.
    pub async fn resume(&self, session: &Session, order_id: &str) -> Result<OrderDto, EngineError> {
        let mut order = self
            .order_repo
            .find_by_id(&OrderId::new(order_id))
            .await?
            .filter(|o| o.account_id() == &session.account_id)
            .ok_or_else(|| EngineError::order_not_found(order_id))?;

        if order.group_id().is_some() {
            return Err(EngineError::validation(
                "IPO batch orders are placed by confirming the bid",
            ));
        }

        if order.last_completed_step().is_some_and(OrderSagaStep::is_complete) {
            return Ok(OrderDto::from_order(&order));
        }

        tracing::info!(
            order_id = %order.id(),
            last_completed_step = ?order.last_completed_step(),
            "Resuming order creation"
        );
        self.continue_saga(&mut order).await?;
        Ok(OrderDto::from_order(&order))
    }

    /// Run every step after the row was persisted.
    async fn continue_saga(&self, order: &mut Order) -> Result<(), EngineError> {
        if !order.is_placed() {
            // 3. Refresh credential. The token is never stored, so a resume
            // refreshes again.
            let token = self
                .gateway
                .refresh_access_token(&order.customer().customer_id)
                .await
                .map_err(|e| partial_failure(order, "refresh_access_token", &e))?;
            order.complete_step(OrderSagaStep::CredentialRefreshed);
            self.order_repo.save(order).await?;

            // 4. Create gateway order
            let request = gateway_order_request(order, token);
            let ack = self
                .gateway
                .create_order(&request)
                .await
                .map_err(|e| partial_failure(order, "create_order", &e))?;

            // 5. Attach ids and open the document
            order.attach_gateway_order(ack.external_order_id, ack.foreign_id, ack.payload)?;
        }

        if order.status() == OrderStatus::OrderInitiated {
            order.apply_status(
                OrderStatus::DigioDocOpened,
                TransitionMode::Strict,
                DOCUMENT_OPENED_EVENT,
            )?;
            record_status_transition(DOCUMENT_OPENED_EVENT, OrderStatus::DigioDocOpened.as_str());
        }
        order.complete_step(OrderSagaStep::GatewayOrderCreated);
        self.order_repo.save(order).await?;
        self.publish(order).await;

        tracing::info!(
            order_id = %order.id(),
            external_order_id = ?order.external_order_id().map(ToString::to_string),
            "Gateway order created"
        );

        // 6. Signing link
        if order.payment_link().is_none() {
            let Some(external_id) = order.external_order_id().cloned() else {
                return Err(EngineError::internal("placed order has no gateway id"));
            };
            let customer = order.customer();
            let link = self
                .gateway
                .get_esigning_url(&external_id, &customer.pan, &customer.email)
                .await
                .map_err(|e| partial_failure(order, "get_esigning_url", &e))?;
            order.set_payment_link(link);
        }
        order.complete_step(OrderSagaStep::SigningLinkIssued);
        self.order_repo.save(order).await?;

        Ok(())
    }

    async fn resolve_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<CustomerSnapshot, EngineError> {
        self.directory
            .find_customer(customer_id)
            .await?
            .ok_or_else(|| {
                EngineError::new(
                    ErrorCode::CustomerNotFound,
                    format!("Customer {customer_id} not found"),
                )
            })
    }

    async fn resolve_product(&self, product_id: &ProductId) -> Result<ProductSnapshot, EngineError> {
        self.directory
            .find_product(product_id)
            .await?
            .ok_or_else(|| {
                EngineError::new(
                    ErrorCode::ProductNotFound,
                    format!("Product {product_id} not found"),
                )
            })
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

/// Log, count and build the error for a saga step that failed.
fn partial_failure(order: &Order, operation: &str, err: &GatewayError) -> EngineError {
    let last_step = order
        .last_completed_step()
        .map_or_else(|| "NONE".to_string(), |s| s.to_string());

    tracing::warn!(
        order_id = %order.id(),
        operation,
        last_completed_step = %last_step,
        error = %err,
        "Order creation stopped part-way"
    );
    record_partial_failure("create_order", &last_step);

    EngineError::partial_failure(
        order.id().as_str(),
        &last_step,
        format!(
            "Order {} was saved but the execution gateway is unavailable; resume the order to continue",
            order.id()
        ),
    )
    .with_context("operation", operation)
}

/// Gateway placement request for an order row.
pub(crate) fn gateway_order_request(
    order: &Order,
    token: crate::application::ports::AccessToken,
) -> GatewayOrderRequest {
    GatewayOrderRequest {
        token,
        reference: order.id().clone(),
        customer_id: order.customer().customer_id.clone(),
        demat_number: order.customer().demat_number.clone(),
        product_code: order.product().code.clone(),
        isin: order.product().isin.clone(),
        units: order.units(),
        unit_price: order.unit_price(),
        return_rate: order.return_rate(),
    }
}
