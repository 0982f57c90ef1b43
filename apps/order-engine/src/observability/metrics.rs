//! Prometheus metrics for the order engine.
//!
//! Recording helpers are no-ops until [`init_metrics`] installs a recorder,
//! so tests and the library can call them freely.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl MetricsConfig {
    /// Metrics listener on `addr` with default buckets.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            // 5ms to 30s: gateway calls are slow
            latency_buckets: vec![0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Order Metrics
// ============================================================================

/// Record an order row created.
///
/// * `kind` - "single" or "ipo"
pub fn record_order_created(kind: &'static str) {
    counter!("order_engine_orders_created_total", "kind" => kind).increment(1);
}

/// Record a status transition applied to an order.
pub fn record_status_transition(event: &str, status: &'static str) {
    counter!(
        "order_engine_status_transitions_total",
        "event" => event.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record an orchestration that stopped part-way.
pub fn record_partial_failure(operation: &'static str, last_step: &str) {
    counter!(
        "order_engine_partial_failures_total",
        "operation" => operation,
        "last_step" => last_step.to_string()
    )
    .increment(1);
}

// ============================================================================
// Gateway Metrics
// ============================================================================

/// Record a gateway call.
///
/// * `operation` - Port method (e.g., "get_price", "create_order")
/// * `outcome` - "ok" or "error"
pub fn record_gateway_call(operation: &'static str, outcome: &'static str, latency_seconds: f64) {
    counter!(
        "order_engine_gateway_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "order_engine_gateway_latency_seconds",
        "operation" => operation
    )
    .record(latency_seconds);
}

// ============================================================================
// Webhook Metrics
// ============================================================================

/// Record an inbound webhook.
///
/// * `outcome` - "applied", "ignored" or "rejected"
pub fn record_webhook_ingested(event: &str, outcome: &'static str) {
    counter!(
        "order_engine_webhooks_ingested_total",
        "event" => event.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record an outbound delivery attempt result.
///
/// * `outcome` - "delivered", "failed" or "dead_lettered"
pub fn record_webhook_delivery(event: &str, outcome: &'static str) {
    counter!(
        "order_engine_webhook_deliveries_total",
        "event" => event.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a dead letter dropped because the queue was full.
pub fn record_dead_letter_evicted(event: &str) {
    counter!(
        "order_engine_dead_letters_evicted_total",
        "event" => event.to_string()
    )
    .increment(1);
}

/// Record a batch of events refused by the delivery queue.
///
/// * `reason` - "full" or "closed"
pub fn record_delivery_rejected(reason: &'static str) {
    counter!(
        "order_engine_delivery_queue_rejected_total",
        "reason" => reason
    )
    .increment(1);
}
