//! Steps of single-order creation, in execution order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last completed step of order creation, persisted on the row so an
/// interrupted creation can be resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSagaStep {
    /// Row written with the quoted price.
    OrderPersisted,
    /// Customer gateway credential refreshed.
    CredentialRefreshed,
    /// Gateway order created and its ids attached.
    GatewayOrderCreated,
    /// Signing link issued.
    SigningLinkIssued,
}

impl OrderSagaStep {
    /// Step that follows this one, `None` after the last.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::OrderPersisted => Some(Self::CredentialRefreshed),
            Self::CredentialRefreshed => Some(Self::GatewayOrderCreated),
            Self::GatewayOrderCreated => Some(Self::SigningLinkIssued),
            Self::SigningLinkIssued => None,
        }
    }

    /// True for the final step.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::SigningLinkIssued)
    }
}

impl fmt::Display for OrderSagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OrderPersisted => "ORDER_PERSISTED",
            Self::CredentialRefreshed => "CREDENTIAL_REFRESHED",
            Self::GatewayOrderCreated => "GATEWAY_ORDER_CREATED",
            Self::SigningLinkIssued => "SIGNING_LINK_ISSUED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered() {
        assert!(OrderSagaStep::OrderPersisted < OrderSagaStep::CredentialRefreshed);
        assert!(OrderSagaStep::GatewayOrderCreated < OrderSagaStep::SigningLinkIssued);
    }

    #[test]
    fn next_walks_to_completion() {
        let mut step = OrderSagaStep::OrderPersisted;
        let mut seen = vec![step];
        while let Some(next) = step.next() {
            seen.push(next);
            step = next;
        }
        assert_eq!(seen.len(), 4);
        assert!(step.is_complete());
    }
}
