//! Strongly-typed identifiers for domain entities.
//!
//! Local ids, gateway-assigned ids and tenant ids are all strings on the
//! wire; the newtypes keep them from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(OrderId, "Local identifier of an order row.");
define_id!(
    ExternalOrderId,
    "Gateway-assigned order identifier (`order_id` on the wire)."
);
define_id!(
    ForeignId,
    "Gateway-assigned foreign reference for an order or customer."
);
define_id!(TransactionId, "Settlement transaction reference.");
define_id!(AccountId, "Owning tenant account.");
define_id!(UserId, "Advisor / platform user.");
define_id!(CustomerId, "Investor (customer) reference.");
define_id!(ProductId, "Product reference.");
define_id!(GroupId, "Correlation key for the rows of one IPO batch bid.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_new_and_display() {
        let id = OrderId::new("ord-123");
        assert_eq!(id.as_str(), "ord-123");
        assert_eq!(format!("{id}"), "ord-123");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(GroupId::generate(), GroupId::generate());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ExternalOrderId::new("EXT-9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"EXT-9\"");

        let parsed: AccountId = serde_json::from_str("\"acct-1\"").unwrap();
        assert_eq!(parsed, AccountId::new("acct-1"));
    }

    #[test]
    fn from_conversions() {
        let id: CustomerId = "cust-1".into();
        assert_eq!(id.clone().into_inner(), "cust-1");
        let id: UserId = String::from("user-1").into();
        assert_eq!(id.as_ref(), "user-1");
    }
}
