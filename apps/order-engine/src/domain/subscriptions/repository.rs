//! Webhook Subscription Repository Trait

use async_trait::async_trait;

use super::errors::SubscriptionError;
use super::subscription::WebhookSubscription;
use crate::domain::shared::AccountId;

/// Repository trait for webhook subscriptions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert or replace the account's subscription.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn upsert(&self, subscription: &WebhookSubscription) -> Result<(), SubscriptionError>;

    /// The account's subscription, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<WebhookSubscription>, SubscriptionError>;
}
