//! Background Event Delivery
//!
//! Wraps an [`EventPublisherPort`] so callers only enqueue events. A single
//! worker task drains the queue and runs the wrapped publisher, which keeps
//! outbound webhook latency off the request path while preserving the
//! order in which events were published.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::application::ports::{EventPublishError, EventPublisherPort};
use crate::domain::order_lifecycle::events::DomainEvent;
use crate::observability::record_delivery_rejected;

/// Batches buffered when no capacity is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1_024;

enum Job {
    Publish(Vec<DomainEvent>),
    Flush(oneshot::Sender<()>),
}

/// Event publisher that hands events to a background delivery task.
#[derive(Debug, Clone)]
pub struct QueuedEventPublisher {
    jobs: mpsc::Sender<Job>,
}

impl QueuedEventPublisher {
    /// Start the delivery worker in front of `inner`.
    ///
    /// Must be called inside a Tokio runtime. The worker exits once every
    /// clone of the returned publisher is dropped and the queue is drained.
    pub fn spawn<P>(inner: Arc<P>, capacity: usize) -> (Self, JoinHandle<()>)
    where
        P: EventPublisherPort + 'static,
    {
        let (jobs, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_worker(inner, rx));
        (Self { jobs }, handle)
    }

    /// Wait until every batch enqueued before this call has been delivered.
    ///
    /// Returns immediately if the worker has stopped.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.jobs.send(Job::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}

async fn run_worker<P>(inner: Arc<P>, mut jobs: mpsc::Receiver<Job>)
where
    P: EventPublisherPort + 'static,
{
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Publish(events) => {
                let count = events.len();
                if let Err(e) = inner.publish_events(events).await {
                    tracing::warn!(events = count, error = %e, "Event delivery failed");
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("Event delivery worker stopped");
}

#[async_trait]
impl EventPublisherPort for QueuedEventPublisher {
    async fn publish_events(&self, events: Vec<DomainEvent>) -> Result<(), EventPublishError> {
        if events.is_empty() {
            return Ok(());
        }
        let count = events.len();

        self.jobs
            .try_send(Job::Publish(events))
            .map_err(|e| {
                let (reason, message) = match e {
                    mpsc::error::TrySendError::Full(_) => ("full", "delivery queue is full"),
                    mpsc::error::TrySendError::Closed(_) => ("closed", "delivery queue is closed"),
                };
                record_delivery_rejected(reason);
                tracing::error!(events = count, reason, "Events dropped by delivery queue");
                EventPublishError::PublishFailed {
                    message: message.to_string(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;
    use crate::domain::order_lifecycle::events::OrderStatusChanged;
    use crate::domain::order_lifecycle::value_objects::OrderStatus;
    use crate::domain::shared::{AccountId, OrderId, Timestamp};

    /// Publisher that blocks every batch until released.
    #[derive(Default)]
    struct GatedPublisher {
        started: Notify,
        release: Notify,
        delivered: Mutex<Vec<String>>,
    }

    impl GatedPublisher {
        fn delivered(&self) -> Vec<String> {
            self.delivered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisherPort for GatedPublisher {
        async fn publish_events(&self, events: Vec<DomainEvent>) -> Result<(), EventPublishError> {
            self.started.notify_one();
            self.release.notified().await;
            self.delivered
                .lock()
                .unwrap()
                .extend(events.iter().map(|e| e.event_name().to_string()));
            Ok(())
        }
    }

    fn event(name: &str) -> DomainEvent {
        DomainEvent::OrderStatusChanged(OrderStatusChanged {
            order_id: OrderId::new("o-1"),
            previous_status: OrderStatus::DigioSignSuccess,
            new_status: OrderStatus::OrderProcessed,
            account_id: AccountId::new("acct-1"),
            event: name.to_string(),
            occurred_at: Timestamp::now(),
        })
    }

    #[tokio::test]
    async fn publish_returns_before_delivery_finishes() {
        let inner = Arc::new(GatedPublisher::default());
        let (publisher, _worker) = QueuedEventPublisher::spawn(Arc::clone(&inner), 8);

        tokio::time::timeout(
            Duration::from_secs(1),
            publisher.publish_events(vec![event("orderProcessed")]),
        )
        .await
        .expect("publish blocked on delivery")
        .unwrap();
        inner.started.notified().await;
        assert!(inner.delivered().is_empty());

        inner.release.notify_one();
        publisher.flush().await;
        assert_eq!(inner.delivered(), vec!["orderProcessed"]);
    }

    #[tokio::test]
    async fn batches_are_delivered_in_publish_order() {
        let inner = Arc::new(GatedPublisher::default());
        let (publisher, _worker) = QueuedEventPublisher::spawn(Arc::clone(&inner), 8);

        for name in ["documentOpened", "digioSignSuccess", "orderProcessed"] {
            publisher.publish_event(event(name)).await.unwrap();
        }
        for _ in 0..3 {
            inner.started.notified().await;
            inner.release.notify_one();
        }
        publisher.flush().await;

        assert_eq!(
            inner.delivered(),
            vec!["documentOpened", "digioSignSuccess", "orderProcessed"]
        );
    }

    #[tokio::test]
    async fn full_queue_rejects_instead_of_waiting() {
        let inner = Arc::new(GatedPublisher::default());
        let (publisher, _worker) = QueuedEventPublisher::spawn(Arc::clone(&inner), 1);

        publisher.publish_event(event("first")).await.unwrap();
        inner.started.notified().await;
        publisher.publish_event(event("second")).await.unwrap();

        let err = publisher.publish_event(event("third")).await.unwrap_err();
        assert!(matches!(err, EventPublishError::PublishFailed { .. }));
        assert!(err.to_string().contains("full"));

        inner.release.notify_one();
        inner.started.notified().await;
        inner.release.notify_one();
        publisher.flush().await;
        assert_eq!(inner.delivered(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn empty_batch_is_not_queued() {
        let inner = Arc::new(GatedPublisher::default());
        let (publisher, _worker) = QueuedEventPublisher::spawn(Arc::clone(&inner), 1);

        publisher.publish_events(Vec::new()).await.unwrap();
        publisher.flush().await;
        assert!(inner.delivered().is_empty());
    }
}
