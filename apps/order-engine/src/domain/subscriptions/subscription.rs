//! Webhook subscription entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::errors::SubscriptionError;
use crate::domain::order_lifecycle::events::is_subscribable_event;
use crate::domain::shared::{AccountId, Timestamp};

/// HTTP method used for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryMethod {
    /// POST
    #[default]
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// Delivery target registered by a tenant account. One per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSubscription {
    account_id: AccountId,
    url: String,
    method: DeliveryMethod,
    events: BTreeSet<String>,
    updated_at: Timestamp,
}

impl WebhookSubscription {
    /// Build a validated subscription.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is not http(s), the event set is empty, or
    /// an event name is not one the engine raises.
    pub fn new(
        account_id: AccountId,
        url: impl Into<String>,
        method: DeliveryMethod,
        events: impl IntoIterator<Item = String>,
    ) -> Result<Self, SubscriptionError> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SubscriptionError::InvalidParameters {
                field: "url".to_string(),
                message: "url must be http or https".to_string(),
            });
        }

        let events: BTreeSet<String> = events.into_iter().collect();
        if events.is_empty() {
            return Err(SubscriptionError::InvalidParameters {
                field: "events".to_string(),
                message: "at least one event is required".to_string(),
            });
        }

        if let Some(unknown) = events.iter().find(|name| !is_subscribable_event(name)) {
            return Err(SubscriptionError::InvalidParameters {
                field: "events".to_string(),
                message: format!("unknown event: {unknown}"),
            });
        }

        Ok(Self {
            account_id,
            url,
            method,
            events,
            updated_at: Timestamp::now(),
        })
    }

    /// Owning account.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Delivery URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Delivery method.
    #[must_use]
    pub const fn method(&self) -> DeliveryMethod {
        self.method
    }

    /// Subscribed event names.
    #[must_use]
    pub const fn events(&self) -> &BTreeSet<String> {
        &self.events
    }

    /// Last upsert time.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// True if this subscription wants `event`.
    #[must_use]
    pub fn subscribes_to(&self, event: &str) -> bool {
        self.events.contains(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn valid_subscription() {
        let sub = WebhookSubscription::new(
            AccountId::new("acct-1"),
            "https://hooks.example.com/orders",
            DeliveryMethod::Post,
            events(&["orderProcessed", "kycRejected", "orderProcessed"]),
        )
        .unwrap();

        assert_eq!(sub.events().len(), 2);
        assert!(sub.subscribes_to("kycRejected"));
        assert!(!sub.subscribes_to("paymentFailed"));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = WebhookSubscription::new(
            AccountId::new("acct-1"),
            "ftp://hooks.example.com",
            DeliveryMethod::Post,
            events(&["orderProcessed"]),
        )
        .unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidParameters { field, .. } if field == "url"));
    }

    #[test]
    fn rejects_empty_and_unknown_events() {
        assert!(
            WebhookSubscription::new(
                AccountId::new("acct-1"),
                "https://hooks.example.com",
                DeliveryMethod::Put,
                Vec::new(),
            )
            .is_err()
        );

        let err = WebhookSubscription::new(
            AccountId::new("acct-1"),
            "https://hooks.example.com",
            DeliveryMethod::Put,
            events(&["orderExploded"]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("orderExploded"));
    }

    #[test]
    fn method_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&DeliveryMethod::Patch).unwrap(),
            "\"PATCH\""
        );
    }
}
