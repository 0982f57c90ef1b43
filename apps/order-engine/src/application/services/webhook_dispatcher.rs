//! Webhook Fan-out Dispatcher
//!
//! Delivers domain events to every tenant subscription registered for the
//! event name. Two delivery modes:
//!
//! - `fail_fast`: the first failing subscriber aborts the remaining
//!   deliveries and the publish call fails with `ServiceUnavailable`.
//! - `isolated`: every delivery retries with backoff on its own and
//!   failures that exhaust retries land in the shared [`DeadLetterQueue`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    EventPublishError, EventPublisherPort, WebhookDelivery, WebhookEnvelope, WebhookSendError,
    WebhookSenderPort,
};
use crate::domain::order_lifecycle::events::DomainEvent;
use super::dead_letters::{DeadLetter, DeadLetterQueue};
use crate::domain::shared::{AccountId, Timestamp};
use crate::domain::subscriptions::{SubscriptionRepository, WebhookSubscription};
use crate::observability::record_webhook_delivery;
use crate::resilience::RetryPolicy;

/// How subscriber failures affect the rest of a fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Stop at the first failure.
    #[default]
    FailFast,
    /// Retry each subscriber independently and dead-letter exhausted ones.
    Isolated,
}

/// Event publisher that fans events out to webhook subscribers.
pub struct WebhookFanoutDispatcher<S, W>
where
    S: SubscriptionRepository,
    W: WebhookSenderPort,
{
    subscriptions: Arc<S>,
    sender: Arc<W>,
    mode: DeliveryMode,
    retry: RetryPolicy,
    dead_letters: Arc<DeadLetterQueue>,
}

impl<S, W> WebhookFanoutDispatcher<S, W>
where
    S: SubscriptionRepository,
    W: WebhookSenderPort,
{
    /// Create a new dispatcher.
    pub fn new(
        subscriptions: Arc<S>,
        sender: Arc<W>,
        mode: DeliveryMode,
        retry: RetryPolicy,
        dead_letters: Arc<DeadLetterQueue>,
    ) -> Self {
        Self {
            subscriptions,
            sender,
            mode,
            retry,
            dead_letters,
        }
    }

    /// Configured delivery mode.
    #[must_use]
    pub const fn mode(&self) -> DeliveryMode {
        self.mode
    }

    /// Snapshot of deliveries given up so far.
    #[must_use]
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.all()
    }

    /// Subscriptions of the event's accounts that want this event.
    async fn matching_subscriptions(
        &self,
        event: &DomainEvent,
    ) -> Result<Vec<WebhookSubscription>, EventPublishError> {
        let mut matches = Vec::new();
        for account_id in event.account_ids() {
            let subscription = self
                .subscriptions
                .find_by_account(&account_id)
                .await
                .map_err(|e| EventPublishError::PublishFailed {
                    message: e.to_string(),
                })?;

            if let Some(subscription) = subscription
                && subscription.subscribes_to(event.event_name())
            {
                matches.push(subscription);
            }
        }
        Ok(matches)
    }

    async fn deliver_isolated(&self, delivery: &WebhookDelivery, account_id: &AccountId) {
        let mut backoff = self.retry.backoff();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.sender.send(delivery).await {
                Ok(()) => {
                    record_webhook_delivery(&delivery.body.event, "delivered");
                    return;
                }
                Err(e) => {
                    record_webhook_delivery(&delivery.body.event, "failed");
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            account_id = %account_id,
                            url = %delivery.url,
                            event = %delivery.body.event,
                            attempt = attempts,
                            delay = ?delay,
                            error = %e,
                            "Webhook delivery failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    self.dead_letter(delivery, account_id, &e, attempts);
                    return;
                }
            }
        }
    }

    fn dead_letter(
        &self,
        delivery: &WebhookDelivery,
        account_id: &AccountId,
        error: &WebhookSendError,
        attempts: u32,
    ) {
        tracing::error!(
            account_id = %account_id,
            url = %delivery.url,
            event = %delivery.body.event,
            attempts,
            error = %error,
            "Webhook delivery dead-lettered"
        );
        record_webhook_delivery(&delivery.body.event, "dead_lettered");

        self.dead_letters.push(DeadLetter {
            account_id: account_id.clone(),
            url: delivery.url.clone(),
            event: delivery.body.event.clone(),
            error: error.to_string(),
            attempts,
            failed_at: Timestamp::now(),
        });
    }
}

#[async_trait]
impl<S, W> EventPublisherPort for WebhookFanoutDispatcher<S, W>
where
    S: SubscriptionRepository + 'static,
    W: WebhookSenderPort + 'static,
{
    async fn publish_events(&self, events: Vec<DomainEvent>) -> Result<(), EventPublishError> {
        for event in events {
            let subscriptions = self.matching_subscriptions(&event).await?;
            if subscriptions.is_empty() {
                tracing::debug!(event = %event.event_name(), "No webhook subscribers for event");
                continue;
            }

            for subscription in subscriptions {
                let delivery = WebhookDelivery {
                    url: subscription.url().to_string(),
                    method: subscription.method(),
                    body: WebhookEnvelope {
                        event: event.event_name().to_string(),
                        payload: event.clone(),
                    },
                };

                match self.mode {
                    DeliveryMode::FailFast => {
                        if let Err(e) = self.sender.send(&delivery).await {
                            record_webhook_delivery(&delivery.body.event, "failed");
                            tracing::error!(
                                account_id = %subscription.account_id(),
                                url = %delivery.url,
                                event = %delivery.body.event,
                                error = %e,
                                "Webhook delivery failed, aborting fan-out"
                            );
                            return Err(EventPublishError::ServiceUnavailable {
                                message: e.to_string(),
                            });
                        }
                        record_webhook_delivery(&delivery.body.event, "delivered");
                    }
                    DeliveryMode::Isolated => {
                        self.deliver_isolated(&delivery, subscription.account_id())
                            .await;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::order_lifecycle::events::{CustomerKycChanged, OrderStatusChanged};
    use crate::domain::order_lifecycle::value_objects::{KycStatus, OrderStatus};
    use crate::domain::shared::{CustomerId, OrderId};
    use crate::domain::subscriptions::DeliveryMethod;
    use crate::infrastructure::persistence::InMemorySubscriptionRepository;

    /// Records deliveries and fails for URLs listed in `failing`.
    #[derive(Default)]
    struct RecordingSender {
        failing: Vec<String>,
        delivered: Mutex<Vec<String>>,
        attempts: Mutex<Vec<String>>,
    }

    impl RecordingSender {
        fn failing(urls: &[&str]) -> Self {
            Self {
                failing: urls.iter().map(ToString::to_string).collect(),
                ..Self::default()
            }
        }

        fn delivered(&self) -> Vec<String> {
            self.delivered.lock().unwrap().clone()
        }

        fn attempts_for(&self, url: &str) -> usize {
            self.attempts
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.as_str() == url)
                .count()
        }
    }

    #[async_trait]
    impl WebhookSenderPort for RecordingSender {
        async fn send(&self, delivery: &WebhookDelivery) -> Result<(), WebhookSendError> {
            self.attempts.lock().unwrap().push(delivery.url.clone());
            if self.failing.contains(&delivery.url) {
                return Err(WebhookSendError::HttpStatus { status: 503 });
            }
            self.delivered.lock().unwrap().push(delivery.url.clone());
            Ok(())
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
            multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }

    async fn subscribe(repo: &InMemorySubscriptionRepository, account: &str, url: &str, events: &[&str]) {
        let subscription = WebhookSubscription::new(
            AccountId::new(account),
            url,
            DeliveryMethod::Post,
            events.iter().map(ToString::to_string),
        )
        .unwrap();
        repo.upsert(&subscription).await.unwrap();
    }

    fn kyc_event(accounts: &[&str]) -> DomainEvent {
        DomainEvent::CustomerKycChanged(CustomerKycChanged {
            customer_id: CustomerId::new("cust-1"),
            kyc_status: KycStatus::Accepted,
            account_ids: accounts.iter().map(|a| AccountId::new(*a)).collect(),
            remarks: None,
            event: "kycAccepted".to_string(),
            occurred_at: Timestamp::now(),
        })
    }

    fn processed_event(account: &str) -> DomainEvent {
        DomainEvent::OrderStatusChanged(OrderStatusChanged {
            order_id: OrderId::new("o-1"),
            previous_status: OrderStatus::DigioSignSuccess,
            new_status: OrderStatus::OrderProcessed,
            account_id: AccountId::new(account),
            event: "orderProcessed".to_string(),
            occurred_at: Timestamp::now(),
        })
    }

    #[tokio::test]
    async fn delivers_only_to_matching_event_subscriptions() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        subscribe(&repo, "a1", "https://a1.test/hook", &["orderProcessed"]).await;
        subscribe(&repo, "a2", "https://a2.test/hook", &["orderRejected"]).await;
        let sender = Arc::new(RecordingSender::default());

        let dispatcher = WebhookFanoutDispatcher::new(
            repo,
            Arc::clone(&sender),
            DeliveryMode::FailFast,
            fast_retry(),
            Arc::new(DeadLetterQueue::default()),
        );

        dispatcher
            .publish_events(vec![processed_event("a1"), processed_event("a2")])
            .await
            .unwrap();

        assert_eq!(sender.delivered(), vec!["https://a1.test/hook"]);
    }

    #[tokio::test]
    async fn fail_fast_aborts_remaining_subscribers() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        subscribe(&repo, "a1", "https://down.test/hook", &["kycAccepted"]).await;
        subscribe(&repo, "a2", "https://up.test/hook", &["kycAccepted"]).await;
        let sender = Arc::new(RecordingSender::failing(&["https://down.test/hook"]));

        let dispatcher = WebhookFanoutDispatcher::new(
            repo,
            Arc::clone(&sender),
            DeliveryMode::FailFast,
            fast_retry(),
            Arc::new(DeadLetterQueue::default()),
        );

        let result = dispatcher.publish_event(kyc_event(&["a1", "a2"])).await;

        assert!(matches!(
            result,
            Err(EventPublishError::ServiceUnavailable { .. })
        ));
        assert!(sender.delivered().is_empty());
        assert_eq!(sender.attempts_for("https://down.test/hook"), 1);
        assert!(dispatcher.dead_letters().is_empty());
    }

    #[tokio::test]
    async fn isolated_mode_keeps_delivering_and_dead_letters_failures() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        subscribe(&repo, "a1", "https://down.test/hook", &["kycAccepted"]).await;
        subscribe(&repo, "a2", "https://up.test/hook", &["kycAccepted"]).await;
        let sender = Arc::new(RecordingSender::failing(&["https://down.test/hook"]));

        let dispatcher = WebhookFanoutDispatcher::new(
            repo,
            Arc::clone(&sender),
            DeliveryMode::Isolated,
            fast_retry(),
            Arc::new(DeadLetterQueue::default()),
        );

        dispatcher
            .publish_event(kyc_event(&["a1", "a2"]))
            .await
            .unwrap();

        assert_eq!(sender.delivered(), vec!["https://up.test/hook"]);
        assert_eq!(sender.attempts_for("https://down.test/hook"), 3);

        let dead = dispatcher.dead_letters();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].account_id.as_str(), "a1");
        assert_eq!(dead[0].event, "kycAccepted");
        assert_eq!(dead[0].attempts, 3);
    }

    #[tokio::test]
    async fn event_without_subscribers_is_noop() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = WebhookFanoutDispatcher::new(
            repo,
            Arc::clone(&sender),
            DeliveryMode::default(),
            fast_retry(),
            Arc::new(DeadLetterQueue::default()),
        );

        dispatcher.publish_event(processed_event("nobody")).await.unwrap();
        assert!(sender.delivered().is_empty());
    }

    #[tokio::test]
    async fn dead_letters_are_capped_by_the_shared_queue() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        subscribe(&repo, "a1", "https://down-1.test/hook", &["kycAccepted"]).await;
        subscribe(&repo, "a2", "https://down-2.test/hook", &["kycAccepted"]).await;
        let sender = Arc::new(RecordingSender::failing(&[
            "https://down-1.test/hook",
            "https://down-2.test/hook",
        ]));
        let queue = Arc::new(DeadLetterQueue::new(1));

        let dispatcher = WebhookFanoutDispatcher::new(
            repo,
            sender,
            DeliveryMode::Isolated,
            fast_retry(),
            Arc::clone(&queue),
        );

        dispatcher
            .publish_event(kyc_event(&["a1", "a2"]))
            .await
            .unwrap();

        let dead = queue.all();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].account_id.as_str(), "a2");
        assert_eq!(dispatcher.dead_letters(), dead);
    }
}
