//! Observability: structured logging and Prometheus metrics.

mod logging;
mod metrics;

pub use logging::{LogFormat, init_tracing};
pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_dead_letter_evicted,
    record_delivery_rejected, record_gateway_call, record_order_created, record_partial_failure,
    record_status_transition, record_webhook_delivery, record_webhook_ingested,
};
