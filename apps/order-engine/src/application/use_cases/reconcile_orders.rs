//! Reconcile Orders Use Case
//!
//! Periodic sweep over placed, non-terminal orders. Orders are grouped by
//! product and customer; each group costs one credential refresh and one
//! timeline read. Statuses that differ from the timeline are updated.
//! A failing group is recorded in the report and the sweep moves on.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use super::status_sync::{apply_entry, map_entries};
use crate::application::ports::{EventPublisherPort, ExecutionGatewayPort};
use crate::domain::order_lifecycle::events::TIMELINE_RECONCILED_EVENT;
use crate::domain::order_lifecycle::{Order, OrderRepository, TransitionMode};
use crate::domain::shared::{CustomerId, ExternalOrderId};
use crate::error::{EngineError, ErrorCode};

/// Outcome of one reconciliation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Product/customer groups read from the gateway.
    pub groups: usize,
    /// Orders whose status changed.
    pub updated: usize,
    /// Orders already matching the timeline.
    pub unchanged: usize,
    /// Status changes refused in strict mode.
    pub rejected: usize,
    /// Timeline entries with no local counterpart in the group.
    pub unmatched: usize,
    /// One line per failed group.
    pub errors: Vec<String>,
}

/// Use case for timeline reconciliation.
pub struct ReconcileOrdersUseCase<G, O, E>
where
    G: ExecutionGatewayPort,
    O: OrderRepository,
    E: EventPublisherPort,
{
    gateway: Arc<G>,
    order_repo: Arc<O>,
    event_publisher: Arc<E>,
    mode: TransitionMode,
}

impl<G, O, E> ReconcileOrdersUseCase<G, O, E>
where
    G: ExecutionGatewayPort,
    O: OrderRepository,
    E: EventPublisherPort,
{
    /// Create a new `ReconcileOrdersUseCase`.
    pub const fn new(
        gateway: Arc<G>,
        order_repo: Arc<O>,
        event_publisher: Arc<E>,
        mode: TransitionMode,
    ) -> Self {
        Self {
            gateway,
            order_repo,
            event_publisher,
            mode,
        }
    }

    /// Run one sweep.
    ///
    /// # Errors
    ///
    /// Only if the active orders cannot be loaded; group failures are
    /// reported in [`ReconciliationReport::errors`].
    pub async fn execute(&self) -> Result<ReconciliationReport, EngineError> {
        let active = self.order_repo.find_active_placed().await?;

        let mut groups: BTreeMap<(String, CustomerId), Vec<Order>> = BTreeMap::new();
        for order in active {
            groups
                .entry((order.product().code.clone(), order.customer().customer_id.clone()))
                .or_default()
                .push(order);
        }

        let mut report = ReconciliationReport {
            groups: groups.len(),
            ..ReconciliationReport::default()
        };

        for ((product_code, customer_id), orders) in groups {
            if let Err(e) = self
                .reconcile_group(&product_code, &customer_id, orders, &mut report)
                .await
            {
                tracing::warn!(
                    product_code = %product_code,
                    customer_id = %customer_id,
                    error = %e,
                    "Timeline reconciliation failed for group"
                );
                report
                    .errors
                    .push(format!("{product_code}/{customer_id}: {}", e.message()));
            }
        }

        tracing::info!(
            groups = report.groups,
            updated = report.updated,
            unchanged = report.unchanged,
            rejected = report.rejected,
            unmatched = report.unmatched,
            errors = report.errors.len(),
            "Timeline reconciliation finished"
        );
        Ok(report)
    }

    async fn reconcile_group(
        &self,
        product_code: &str,
        customer_id: &CustomerId,
        orders: Vec<Order>,
        report: &mut ReconciliationReport,
    ) -> Result<(), EngineError> {
        let token = self
            .gateway
            .refresh_access_token(customer_id)
            .await
            .map_err(|e| {
                EngineError::gateway(ErrorCode::GatewayUnavailable, "refresh_access_token", &e)
            })?;
        let entries = self
            .gateway
            .get_transaction_timeline(product_code, &token)
            .await
            .map_err(|e| {
                EngineError::gateway(ErrorCode::GatewayUnavailable, "get_transaction_timeline", &e)
            })?;
        let mapped = map_entries(entries)?;

        let mut by_external: HashMap<ExternalOrderId, Order> = orders
            .into_iter()
            .filter_map(|o| o.external_order_id().cloned().map(|id| (id, o)))
            .collect();

        for (entry, status) in mapped {
            let Some(order) = by_external.get_mut(&entry.order_id) else {
                report.unmatched += 1;
                continue;
            };
            if order.status() == status {
                report.unchanged += 1;
                continue;
            }
            if !apply_entry(order, &entry, status, self.mode, TIMELINE_RECONCILED_EVENT) {
                report.rejected += 1;
                continue;
            }

            self.order_repo.save(order).await?;
            report.updated += 1;
            tracing::info!(
                order_id = %order.id(),
                external_order_id = %entry.order_id,
                status = %status,
                "Order status reconciled from timeline"
            );

            let events = order.drain_events();
            if let Err(e) = self.event_publisher.publish_events(events).await {
                tracing::error!(order_id = %order.id(), error = %e, "Failed to publish order events");
            }
        }
        Ok(())
    }
}
