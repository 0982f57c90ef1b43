//! Order Aggregate Root
//!
//! One investment transaction against a single product. Quantities and the
//! product/customer snapshots are fixed at creation; afterwards the order
//! only gains gateway correlation ids, payloads, a signing link and status
//! changes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::errors::OrderError;
use crate::domain::order_lifecycle::events::{DomainEvent, OrderStatusChanged};
use crate::domain::order_lifecycle::services::{OrderStateMachine, TransitionMode};
use crate::domain::order_lifecycle::value_objects::{
    CustomerSnapshot, OrderSagaStep, OrderStatus, ProductSnapshot,
};
use crate::domain::shared::{
    AccountId, ExternalOrderId, ForeignId, GroupId, OrderId, Timestamp, TransactionId, UserId,
};

/// Command to create a new order row.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Owning account.
    pub account_id: AccountId,
    /// Advisor placing the order.
    pub advisor_id: UserId,
    /// Customer identity at order time.
    pub customer: CustomerSnapshot,
    /// Product identity at order time.
    pub product: ProductSnapshot,
    /// Units requested.
    pub units: u32,
    /// Requested annualized return rate (percent).
    pub return_rate: Decimal,
    /// Price per unit (quoted, or the bid price for IPO series).
    pub unit_price: Decimal,
    /// Customer consent captured by the advisor.
    pub consent_given: bool,
    /// Batch correlation; `Some` for IPO rows.
    pub group_id: Option<GroupId>,
}

impl CreateOrderCommand {
    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns error if a quantity or rate is out of range.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.units == 0 {
            return Err(OrderError::InvalidParameters {
                field: "units".to_string(),
                message: "units must be greater than zero".to_string(),
            });
        }

        if self.return_rate.is_sign_negative() {
            return Err(OrderError::InvalidParameters {
                field: "return_rate".to_string(),
                message: "return rate cannot be negative".to_string(),
            });
        }

        if self.unit_price <= Decimal::ZERO {
            return Err(OrderError::InvalidParameters {
                field: "unit_price".to_string(),
                message: "unit price must be positive".to_string(),
            });
        }

        Ok(())
    }
}

/// Order Aggregate Root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    status: OrderStatus,
    units: u32,
    return_rate: Decimal,
    unit_price: Decimal,
    user_amount: Decimal,
    product: ProductSnapshot,
    customer: CustomerSnapshot,
    external_order_id: Option<ExternalOrderId>,
    foreign_id: Option<ForeignId>,
    transaction_id: Option<TransactionId>,
    metadata: Option<serde_json::Value>,
    account_id: AccountId,
    advisor_id: UserId,
    group_id: Option<GroupId>,
    payment_link: Option<String>,
    consent_given: bool,
    last_completed_step: Option<OrderSagaStep>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Create a new order from a command.
    ///
    /// IPO rows (with a group id) start in `PAYMENT_LINK_SENT`, single
    /// orders in `ORDER_INITIATED`. `user_amount` is fixed here.
    ///
    /// # Errors
    ///
    /// Returns error if command validation fails.
    pub fn new(cmd: CreateOrderCommand) -> Result<Self, OrderError> {
        cmd.validate()?;
        let user_amount = cmd
            .unit_price
            .checked_mul(Decimal::from(cmd.units))
            .ok_or_else(|| OrderError::InvalidParameters {
                field: "unit_price".to_string(),
                message: "units times unit price is out of range".to_string(),
            })?;

        let now = Timestamp::now();
        let status = if cmd.group_id.is_some() {
            OrderStatus::PaymentLinkSent
        } else {
            OrderStatus::OrderInitiated
        };

        Ok(Self {
            id: OrderId::generate(),
            status,
            units: cmd.units,
            return_rate: cmd.return_rate,
            unit_price: cmd.unit_price,
            user_amount,
            product: cmd.product,
            customer: cmd.customer,
            external_order_id: None,
            foreign_id: None,
            transaction_id: None,
            metadata: None,
            account_id: cmd.account_id,
            advisor_id: cmd.advisor_id,
            group_id: cmd.group_id,
            payment_link: None,
            consent_given: cmd.consent_given,
            last_completed_step: None,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Local id.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Units.
    #[must_use]
    pub const fn units(&self) -> u32 {
        self.units
    }

    /// Requested return rate.
    #[must_use]
    pub const fn return_rate(&self) -> Decimal {
        self.return_rate
    }

    /// Price per unit.
    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// `units × unit_price`, fixed at creation.
    #[must_use]
    pub const fn user_amount(&self) -> Decimal {
        self.user_amount
    }

    /// Product snapshot.
    #[must_use]
    pub const fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    /// Customer snapshot.
    #[must_use]
    pub const fn customer(&self) -> &CustomerSnapshot {
        &self.customer
    }

    /// Gateway order id.
    #[must_use]
    pub const fn external_order_id(&self) -> Option<&ExternalOrderId> {
        self.external_order_id.as_ref()
    }

    /// Gateway foreign id.
    #[must_use]
    pub const fn foreign_id(&self) -> Option<&ForeignId> {
        self.foreign_id.as_ref()
    }

    /// Settlement transaction id.
    #[must_use]
    pub const fn transaction_id(&self) -> Option<&TransactionId> {
        self.transaction_id.as_ref()
    }

    /// Last gateway payload, verbatim.
    #[must_use]
    pub const fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    /// Owning account.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Advisor.
    #[must_use]
    pub const fn advisor_id(&self) -> &UserId {
        &self.advisor_id
    }

    /// IPO batch group.
    #[must_use]
    pub const fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }

    /// Signing link last issued for this order.
    #[must_use]
    pub fn payment_link(&self) -> Option<&str> {
        self.payment_link.as_deref()
    }

    /// Consent flag captured at creation.
    #[must_use]
    pub const fn consent_given(&self) -> bool {
        self.consent_given
    }

    /// Saga marker.
    #[must_use]
    pub const fn last_completed_step(&self) -> Option<OrderSagaStep> {
        self.last_completed_step
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last mutation time.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// True once the gateway has assigned an order id.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.external_order_id.is_some()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Attach the gateway's correlation ids and payload.
    ///
    /// Re-attaching the same ids is a no-op for the ids (the payload is
    /// still refreshed); a different value is refused.
    ///
    /// # Errors
    ///
    /// Returns `ExternalIdImmutable` if either id is already set to another value.
    pub fn attach_gateway_order(
        &mut self,
        external_order_id: ExternalOrderId,
        foreign_id: Option<ForeignId>,
        payload: serde_json::Value,
    ) -> Result<(), OrderError> {
        if let Some(current) = &self.external_order_id
            && *current != external_order_id
        {
            return Err(OrderError::ExternalIdImmutable {
                field: "order_id",
                current: current.to_string(),
                attempted: external_order_id.into_inner(),
            });
        }

        if let (Some(current), Some(attempted)) = (&self.foreign_id, &foreign_id)
            && current != attempted
        {
            return Err(OrderError::ExternalIdImmutable {
                field: "foreign_id",
                current: current.to_string(),
                attempted: attempted.to_string(),
            });
        }

        self.external_order_id = Some(external_order_id);
        if foreign_id.is_some() {
            self.foreign_id = foreign_id;
        }
        self.metadata = Some(payload);
        self.touch();
        Ok(())
    }

    /// Store the latest gateway payload verbatim.
    pub fn record_gateway_payload(&mut self, payload: serde_json::Value) {
        self.metadata = Some(payload);
        self.touch();
    }

    /// Record the settlement transaction reference.
    pub fn record_transaction_id(&mut self, transaction_id: TransactionId) {
        self.transaction_id = Some(transaction_id);
        self.touch();
    }

    /// Store the signing link handed to the customer.
    pub fn set_payment_link(&mut self, link: impl Into<String>) {
        self.payment_link = Some(link.into());
        self.touch();
    }

    /// Advance the saga marker. Never moves backwards.
    pub fn complete_step(&mut self, step: OrderSagaStep) {
        if self.last_completed_step.is_none_or(|current| current < step) {
            self.last_completed_step = Some(step);
            self.touch();
        }
    }

    /// Move to `to`, raising an `OrderStatusChanged` event named `event`.
    ///
    /// In compatibility mode this overwrites unconditionally, so a replayed
    /// event can move a terminal order again.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` in strict mode when the table has
    /// no entry for the move.
    pub fn apply_status(
        &mut self,
        to: OrderStatus,
        mode: TransitionMode,
        event: &str,
    ) -> Result<(), OrderError> {
        let from = self.status;
        OrderStateMachine::check(mode, from, to)?;

        self.status = to;
        self.touch();
        self.events
            .push(DomainEvent::OrderStatusChanged(OrderStatusChanged {
                order_id: self.id.clone(),
                previous_status: from,
                new_status: to,
                account_id: self.account_id.clone(),
                event: event.to_string(),
                occurred_at: self.updated_at,
            }));
        Ok(())
    }

    /// Take all pending domain events.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get pending events without draining.
    #[must_use]
    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_lifecycle::value_objects::ProductType;
    use crate::domain::shared::{CustomerId, ProductId};
    use rust_decimal_macros::dec;

    fn make_create_command() -> CreateOrderCommand {
        CreateOrderCommand {
            account_id: AccountId::new("acct-1"),
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
            return_rate: dec!(12),
            unit_price: dec!(1000),
            consent_given: true,
            group_id: None,
        }
    }

    #[test]
    fn new_single_order_starts_initiated() {
        let order = Order::new(make_create_command()).unwrap();

        assert_eq!(order.status(), OrderStatus::OrderInitiated);
        assert_eq!(order.user_amount(), dec!(10000));
        assert!(order.pending_events().is_empty());
        assert!(!order.is_placed());
        assert!(order.last_completed_step().is_none());
    }

    #[test]
    fn new_ipo_row_starts_payment_link_sent() {
        let mut cmd = make_create_command();
        cmd.group_id = Some(GroupId::new("grp-1"));

        let order = Order::new(cmd).unwrap();
        assert_eq!(order.status(), OrderStatus::PaymentLinkSent);
    }

    #[test]
    fn zero_units_rejected() {
        let mut cmd = make_create_command();
        cmd.units = 0;
        assert!(matches!(
            Order::new(cmd),
            Err(OrderError::InvalidParameters { field, .. }) if field == "units"
        ));
    }

    #[test]
    fn amount_overflow_rejected() {
        let mut cmd = make_create_command();
        cmd.unit_price = Decimal::MAX;
        cmd.units = 2;
        assert!(matches!(
            Order::new(cmd),
            Err(OrderError::InvalidParameters { field, .. }) if field == "unit_price"
        ));
    }

    #[test]
    fn negative_return_rate_rejected() {
        let mut cmd = make_create_command();
        cmd.return_rate = dec!(-1);
        assert!(Order::new(cmd).is_err());
    }

    #[test]
    fn external_ids_are_immutable() {
        let mut order = Order::new(make_create_command()).unwrap();
        order
            .attach_gateway_order(
                ExternalOrderId::new("EXT-1"),
                Some(ForeignId::new("F-1")),
                serde_json::json!({"id": "EXT-1"}),
            )
            .unwrap();

        // Same values again: fine
        order
            .attach_gateway_order(
                ExternalOrderId::new("EXT-1"),
                Some(ForeignId::new("F-1")),
                serde_json::json!({"id": "EXT-1", "v": 2}),
            )
            .unwrap();
        assert_eq!(order.metadata().unwrap()["v"], 2);

        let err = order
            .attach_gateway_order(
                ExternalOrderId::new("EXT-2"),
                None,
                serde_json::Value::Null,
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::ExternalIdImmutable { field: "order_id", .. }));

        let err = order
            .attach_gateway_order(
                ExternalOrderId::new("EXT-1"),
                Some(ForeignId::new("F-2")),
                serde_json::Value::Null,
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::ExternalIdImmutable { field: "foreign_id", .. }));
        assert_eq!(order.external_order_id().unwrap().as_str(), "EXT-1");
    }

    #[test]
    fn apply_status_emits_event() {
        let mut order = Order::new(make_create_command()).unwrap();
        order
            .apply_status(
                OrderStatus::DigioDocOpened,
                TransitionMode::Strict,
                "documentOpened",
            )
            .unwrap();

        let events = order.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DomainEvent::OrderStatusChanged(e) => {
                assert_eq!(e.previous_status, OrderStatus::OrderInitiated);
                assert_eq!(e.new_status, OrderStatus::DigioDocOpened);
                assert_eq!(e.account_id.as_str(), "acct-1");
                assert_eq!(e.event, "documentOpened");
            }
            DomainEvent::CustomerKycChanged(_) => panic!("unexpected event"),
        }
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn compatibility_mode_overwrites_terminal_status() {
        let mut order = Order::new(make_create_command()).unwrap();
        order
            .apply_status(
                OrderStatus::OrderProcessed,
                TransitionMode::Compatibility,
                "orderProcessed",
            )
            .unwrap();
        order
            .apply_status(
                OrderStatus::DigioSignSuccess,
                TransitionMode::Compatibility,
                "digioSignSuccess",
            )
            .unwrap();

        assert_eq!(order.status(), OrderStatus::DigioSignSuccess);
        assert_eq!(order.pending_events().len(), 2);
    }

    #[test]
    fn strict_mode_keeps_status_on_refusal() {
        let mut order = Order::new(make_create_command()).unwrap();
        let result = order.apply_status(
            OrderStatus::OrderProcessed,
            TransitionMode::Strict,
            "orderProcessed",
        );

        assert!(result.is_err());
        assert_eq!(order.status(), OrderStatus::OrderInitiated);
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn saga_marker_never_moves_backwards() {
        let mut order = Order::new(make_create_command()).unwrap();
        order.complete_step(OrderSagaStep::GatewayOrderCreated);
        order.complete_step(OrderSagaStep::OrderPersisted);
        assert_eq!(
            order.last_completed_step(),
            Some(OrderSagaStep::GatewayOrderCreated)
        );
    }

    #[test]
    fn events_are_not_serialized() {
        let mut order = Order::new(make_create_command()).unwrap();
        order
            .apply_status(
                OrderStatus::OrderCancelled,
                TransitionMode::Compatibility,
                "cancellationUpdated",
            )
            .unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let restored: Order = serde_json::from_str(&json).unwrap();
        assert!(restored.pending_events().is_empty());
        assert_eq!(restored.status(), OrderStatus::OrderCancelled);
    }
}
