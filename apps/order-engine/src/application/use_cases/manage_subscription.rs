//! Webhook subscription registry and its dead letters.

use std::sync::Arc;

use crate::application::dto::{DeadLetterDto, RegisterSubscriptionDto, Session, SubscriptionDto};
use crate::application::services::DeadLetterQueue;
use crate::domain::subscriptions::{SubscriptionRepository, WebhookSubscription};
use crate::error::{EngineError, ErrorCode};

/// Use case for a tenant's webhook subscription.
pub struct ManageSubscriptionUseCase<S>
where
    S: SubscriptionRepository,
{
    subscriptions: Arc<S>,
    dead_letters: Arc<DeadLetterQueue>,
}

impl<S> ManageSubscriptionUseCase<S>
where
    S: SubscriptionRepository,
{
    /// Create a new `ManageSubscriptionUseCase`.
    pub const fn new(subscriptions: Arc<S>, dead_letters: Arc<DeadLetterQueue>) -> Self {
        Self {
            subscriptions,
            dead_letters,
        }
    }

    /// Register the account's subscription, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `INVALID_SUBSCRIPTION` for a non-http(s) URL, an empty event list or
    /// an unknown event name.
    pub async fn register(
        &self,
        session: &Session,
        dto: RegisterSubscriptionDto,
    ) -> Result<SubscriptionDto, EngineError> {
        let subscription = WebhookSubscription::new(
            session.account_id.clone(),
            dto.url,
            dto.method,
            dto.events,
        )?;
        self.subscriptions.upsert(&subscription).await?;

        tracing::info!(
            account_id = %session.account_id,
            url = subscription.url(),
            method = %subscription.method(),
            events = subscription.events().len(),
            "Webhook subscription registered"
        );
        Ok(SubscriptionDto::from_subscription(&subscription))
    }

    /// The account's subscription.
    ///
    /// # Errors
    ///
    /// `SUBSCRIPTION_NOT_FOUND` if none is registered.
    pub async fn get(&self, session: &Session) -> Result<SubscriptionDto, EngineError> {
        self.subscriptions
            .find_by_account(&session.account_id)
            .await?
            .map(|s| SubscriptionDto::from_subscription(&s))
            .ok_or_else(|| {
                EngineError::new(
                    ErrorCode::SubscriptionNotFound,
                    "No webhook subscription is registered for this account",
                )
            })
    }

    /// Deliveries to the account that exhausted their retries, oldest first.
    #[must_use]
    pub fn dead_letters(&self, session: &Session) -> Vec<DeadLetterDto> {
        self.dead_letters
            .for_account(&session.account_id)
            .into_iter()
            .map(DeadLetterDto::from)
            .collect()
    }
}
