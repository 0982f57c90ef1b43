//! Reference-data seed file.
//!
//! Loads customers, products, account links, the manager hierarchy and
//! rate caps from YAML into the in-memory adapters.
//!
//! ```yaml
//! customers:
//!   - customer_id: cust-1
//!     foreign_id: GW-77
//!     name: Asha Rao
//!     email: asha@example.com
//!     demat_number: IN3000001
//!     pan: ABCDE1234F
//!     accounts: [acct-1]
//! products:
//!   - product_id: prod-1
//!     code: BOND-9
//!     isin: INE000A01
//!     product_type: BOND
//!     issuer: Acme Finance
//! users:
//!   - user_id: adv-2
//!     manager_id: adv-1
//! rate_caps:
//!   - product_id: prod-1
//!     owner: { kind: account, id: acct-1 }
//!     max_return_rate: "11"
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::directory::InMemoryDirectory;
use super::in_memory::InMemoryRateCapRepository;
use crate::domain::commission::{RateCap, RateCapOwner};
use crate::domain::order_lifecycle::{CustomerSnapshot, ProductSnapshot};
use crate::domain::shared::{AccountId, CustomerId, ForeignId, ProductId, UserId};

/// Seed loading error.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Failed to read the seed file.
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Failed to parse the seed file.
    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_yaml_bw::Error),
}

/// A customer with its gateway reference and account links.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCustomer {
    /// Local reference.
    pub customer_id: CustomerId,
    /// Gateway reference used by KYC webhooks.
    #[serde(default)]
    pub foreign_id: Option<ForeignId>,
    /// Full name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Demat account number.
    pub demat_number: String,
    /// PAN.
    pub pan: String,
    /// Linked tenant accounts.
    #[serde(default)]
    pub accounts: Vec<AccountId>,
}

/// A user and the manager they report to.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    /// The user.
    pub user_id: UserId,
    /// Their manager, if any.
    #[serde(default)]
    pub manager_id: Option<UserId>,
}

/// A rate cap row. Price deviations default to zero.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRateCap {
    /// Product.
    pub product_id: ProductId,
    /// Account or user the cap belongs to.
    pub owner: RateCapOwner,
    /// Maximum return rate.
    pub max_return_rate: Decimal,
    /// Lower price deviation bound.
    #[serde(default)]
    pub min_price_deviation: Decimal,
    /// Upper price deviation bound.
    #[serde(default)]
    pub max_price_deviation: Decimal,
}

/// Parsed seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    /// Customers.
    #[serde(default)]
    pub customers: Vec<SeedCustomer>,
    /// Products.
    #[serde(default)]
    pub products: Vec<ProductSnapshot>,
    /// Users with managers.
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// Rate caps.
    #[serde(default)]
    pub rate_caps: Vec<SeedRateCap>,
}

impl SeedData {
    /// Load a seed file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse seed YAML.
    ///
    /// # Errors
    ///
    /// Returns error if the YAML does not match the seed layout.
    pub fn from_yaml(content: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml_bw::from_str(content)?)
    }

    /// Load everything into the in-memory adapters.
    pub fn apply(self, directory: &InMemoryDirectory, rate_caps: &InMemoryRateCapRepository) {
        let counts = (
            self.customers.len(),
            self.products.len(),
            self.users.len(),
            self.rate_caps.len(),
        );

        for seed in self.customers {
            let customer = CustomerSnapshot {
                customer_id: seed.customer_id.clone(),
                name: seed.name,
                email: seed.email,
                demat_number: seed.demat_number,
                pan: seed.pan,
            };
            directory.add_customer(customer, seed.foreign_id);
            for account_id in seed.accounts {
                directory.link_account(seed.customer_id.clone(), account_id);
            }
        }

        for product in self.products {
            directory.add_product(product);
        }

        for user in self.users {
            if let Some(manager) = user.manager_id {
                directory.add_reportee(manager, user.user_id);
            }
        }

        for cap in self.rate_caps {
            rate_caps.upsert(RateCap {
                product_id: cap.product_id,
                owner: cap.owner,
                max_return_rate: cap.max_return_rate,
                min_price_deviation: cap.min_price_deviation,
                max_price_deviation: cap.max_price_deviation,
            });
        }

        tracing::info!(
            customers = counts.0,
            products = counts.1,
            users = counts.2,
            rate_caps = counts.3,
            "Reference data seeded"
        );
    }
}
