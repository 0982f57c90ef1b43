//! Ingest Webhook Use Case
//!
//! Applies one inbound gateway event. The dispatch table on
//! [`GatewayEvent`] decides whether the event updates an order or carries a
//! KYC verdict for a customer. Nothing here is reported back to the sender;
//! the outcome is logged and counted.

use std::sync::Arc;

use crate::application::dto::{InboundWebhookDto, IngestOutcome};
use crate::application::ports::{DirectoryPort, EventPublisherPort};
use crate::domain::order_lifecycle::{
    CustomerKycChanged, DomainEvent, EventTarget, GatewayEvent, KycStatus, OrderRepository,
    OrderStatus, TransitionMode,
};
use crate::domain::shared::{ExternalOrderId, ForeignId, Timestamp, TransactionId};
use crate::error::EngineError;
use crate::observability::{record_status_transition, record_webhook_ingested};

/// Use case for inbound gateway events.
pub struct IngestWebhookUseCase<O, D, E>
where
    O: OrderRepository,
    D: DirectoryPort,
    E: EventPublisherPort,
{
    order_repo: Arc<O>,
    directory: Arc<D>,
    event_publisher: Arc<E>,
    mode: TransitionMode,
}

impl<O, D, E> IngestWebhookUseCase<O, D, E>
where
    O: OrderRepository,
    D: DirectoryPort,
    E: EventPublisherPort,
{
    /// Create a new `IngestWebhookUseCase`.
    pub const fn new(
        order_repo: Arc<O>,
        directory: Arc<D>,
        event_publisher: Arc<E>,
        mode: TransitionMode,
    ) -> Self {
        Self {
            order_repo,
            directory,
            event_publisher,
            mode,
        }
    }

    /// Transition mode in force.
    pub const fn mode(&self) -> TransitionMode {
        self.mode
    }

    /// Apply one event received on `source`.
    ///
    /// # Errors
    ///
    /// Only repository or directory failures; business outcomes (unknown
    /// event, unknown order, strict rejection) are `Ok`.
    pub async fn execute(
        &self,
        source: &str,
        dto: InboundWebhookDto,
    ) -> Result<IngestOutcome, EngineError> {
        let Some(event) = GatewayEvent::from_name(&dto.event) else {
            tracing::warn!(source, event = %dto.event, "Ignoring unknown webhook event");
            record_webhook_ingested(&dto.event, "ignored");
            return Ok(IngestOutcome::Ignored {
                reason: format!("unknown event {}", dto.event),
            });
        };

        let result = match event.target() {
            EventTarget::Order(status) => self.update_order(source, event, status, &dto.data).await,
            EventTarget::Customer(kyc) => self.publish_kyc(source, event, kyc, &dto.data).await,
        };

        let outcome = match &result {
            Ok(IngestOutcome::OrderUpdated { .. }) => "updated",
            Ok(IngestOutcome::KycPublished { .. }) => "kyc_published",
            Ok(IngestOutcome::Rejected { .. }) => "rejected",
            Ok(IngestOutcome::Ignored { .. }) => "ignored",
            Err(_) => "error",
        };
        record_webhook_ingested(event.name(), outcome);
        result
    }

    async fn update_order(
        &self,
        source: &str,
        event: GatewayEvent,
        status: OrderStatus,
        data: &serde_json::Value,
    ) -> Result<IngestOutcome, EngineError> {
        let Some(external_id) = string_field(data, "orderId") else {
            tracing::warn!(source, event = %event, "Order event without orderId");
            return Ok(IngestOutcome::Ignored {
                reason: "missing orderId".to_string(),
            });
        };

        let Some(mut order) = self
            .order_repo
            .find_by_external_id(&ExternalOrderId::new(external_id))
            .await?
        else {
            tracing::info!(source, event = %event, external_order_id = external_id, "No order for webhook event");
            return Ok(IngestOutcome::Ignored {
                reason: format!("no order with orderId {external_id}"),
            });
        };

        let previous = order.status();
        if let Err(e) = order.apply_status(status, self.mode, event.name()) {
            tracing::warn!(
                source,
                event = %event,
                order_id = %order.id(),
                from = %previous,
                to = %status,
                error = %e,
                "Webhook transition rejected"
            );
            return Ok(IngestOutcome::Rejected {
                order_id: order.id().to_string(),
                reason: e.to_string(),
            });
        }

        order.record_gateway_payload(data.clone());
        if let Some(transaction_id) = string_field(data, "transactionId") {
            order.record_transaction_id(TransactionId::new(transaction_id));
        }
        self.order_repo.save(&order).await?;
        record_status_transition(event.name(), status.as_str());

        tracing::info!(
            source,
            event = %event,
            order_id = %order.id(),
            account_id = %order.account_id(),
            from = %previous,
            to = %status,
            "Order status updated from webhook"
        );

        let events = order.drain_events();
        if let Err(e) = self.event_publisher.publish_events(events).await {
            tracing::error!(order_id = %order.id(), error = %e, "Failed to publish order events");
        }

        Ok(IngestOutcome::OrderUpdated {
            order_id: order.id().to_string(),
            status,
        })
    }

    async fn publish_kyc(
        &self,
        source: &str,
        event: GatewayEvent,
        kyc_status: KycStatus,
        data: &serde_json::Value,
    ) -> Result<IngestOutcome, EngineError> {
        let Some(foreign_id) = string_field(data, "customerId") else {
            tracing::warn!(source, event = %event, "KYC event without customerId");
            return Ok(IngestOutcome::Ignored {
                reason: "missing customerId".to_string(),
            });
        };

        let Some(customer_id) = self
            .directory
            .find_customer_by_foreign_id(&ForeignId::new(foreign_id))
            .await?
        else {
            tracing::info!(source, event = %event, foreign_id, "No customer for KYC event");
            return Ok(IngestOutcome::Ignored {
                reason: format!("no customer with customerId {foreign_id}"),
            });
        };

        let account_ids = self.directory.linked_accounts(&customer_id).await?;
        let accounts = account_ids.len();

        tracing::info!(
            source,
            event = %event,
            customer_id = %customer_id,
            kyc_status = %kyc_status,
            accounts,
            "KYC verdict received"
        );

        let domain_event = DomainEvent::CustomerKycChanged(CustomerKycChanged {
            customer_id: customer_id.clone(),
            kyc_status,
            account_ids,
            remarks: string_field(data, "remarks").map(str::to_string),
            event: event.name().to_string(),
            occurred_at: Timestamp::now(),
        });
        if let Err(e) = self.event_publisher.publish_event(domain_event).await {
            tracing::error!(customer_id = %customer_id, error = %e, "Failed to publish KYC event");
        }

        Ok(IngestOutcome::KycPublished {
            customer_id: customer_id.into_inner(),
            status: kyc_status,
            accounts,
        })
    }
}

fn string_field<'a>(data: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
}
