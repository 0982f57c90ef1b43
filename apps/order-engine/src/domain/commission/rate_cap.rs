//! Rate cap value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{AccountId, ProductId, UserId};

/// Who a rate cap is configured for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RateCapOwner {
    /// Account-wide cap.
    Account(AccountId),
    /// Cap for an individual advisor.
    User(UserId),
}

impl fmt::Display for RateCapOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(id) => write!(f, "account:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Maximum return rate and allowed price deviation for one product/owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCap {
    /// Product the cap applies to.
    pub product_id: ProductId,
    /// Account or user.
    pub owner: RateCapOwner,
    /// Ceiling on the return rate (percent).
    pub max_return_rate: Decimal,
    /// Lower bound on price deviation.
    pub min_price_deviation: Decimal,
    /// Upper bound on price deviation.
    pub max_price_deviation: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_serializes_tagged() {
        let owner = RateCapOwner::User(UserId::new("u-1"));
        let json = serde_json::to_value(&owner).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "user", "id": "u-1"}));
        assert_eq!(owner.to_string(), "user:u-1");
    }
}
