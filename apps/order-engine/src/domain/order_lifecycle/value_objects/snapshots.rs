//! Product and customer identity captured on the order at creation time.
//!
//! Snapshots are never refreshed from the directory afterwards, so an order
//! keeps showing what the customer signed even if the master data changes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{CustomerId, ProductId};

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    /// Listed or unlisted bond.
    Bond,
    /// IPO allotment (multi-series batch bids).
    Ipo,
    /// Mutual fund units.
    MutualFund,
    /// Unlisted equity.
    UnlistedEquity,
    /// Market-linked debenture; commission uses a fixed spread.
    Mld,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bond => "BOND",
            Self::Ipo => "IPO",
            Self::MutualFund => "MUTUAL_FUND",
            Self::UnlistedEquity => "UNLISTED_EQUITY",
            Self::Mld => "MLD",
        };
        f.write_str(s)
    }
}

/// Product identity at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product reference.
    pub product_id: ProductId,
    /// Gateway product code used for pricing and placement.
    pub code: String,
    /// ISIN.
    pub isin: String,
    /// Category.
    pub product_type: ProductType,
    /// Issuer name.
    pub issuer: String,
}

/// Customer identity at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    /// Customer reference.
    pub customer_id: CustomerId,
    /// Full name.
    pub name: String,
    /// Contact email, also used for the signing link.
    pub email: String,
    /// Demat account number.
    pub demat_number: String,
    /// PAN, required by the e-sign request.
    pub pan: String,
}
