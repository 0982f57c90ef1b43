//! Applying gateway `{orderId, status}` lists to local rows.
//!
//! Shared by IPO cancellation and timeline reconciliation. A list is
//! validated as a whole before any row is touched.

use std::str::FromStr;

use crate::application::ports::ExternalStatusEntry;
use crate::domain::order_lifecycle::{
    ExternalOrderStatus, Order, OrderError, OrderStatus, TransitionMode,
};
use crate::observability::record_status_transition;

/// Map every entry to a local status.
///
/// # Errors
///
/// `UnknownExternalStatus` for the first status outside the fixed
/// vocabulary; nothing has been applied at that point.
pub(crate) fn map_entries(
    entries: Vec<ExternalStatusEntry>,
) -> Result<Vec<(ExternalStatusEntry, OrderStatus)>, OrderError> {
    entries
        .into_iter()
        .map(|entry| {
            let status = ExternalOrderStatus::from_str(&entry.status)
                .map_err(|value| OrderError::UnknownExternalStatus { value })?
                .to_order_status();
            Ok((entry, status))
        })
        .collect()
}

/// Apply one mapped entry. Returns false if strict mode refused the move,
/// in which case the row is untouched.
pub(crate) fn apply_entry(
    order: &mut Order,
    entry: &ExternalStatusEntry,
    status: OrderStatus,
    mode: TransitionMode,
    event: &str,
) -> bool {
    if let Err(e) = order.apply_status(status, mode, event) {
        tracing::warn!(
            order_id = %order.id(),
            external_order_id = %entry.order_id,
            from = %order.status(),
            to = %status,
            error = %e,
            "Status update rejected"
        );
        return false;
    }
    if let Some(transaction_id) = &entry.transaction_id {
        order.record_transaction_id(transaction_id.clone());
    }
    record_status_transition(event, status.as_str());
    true
}
