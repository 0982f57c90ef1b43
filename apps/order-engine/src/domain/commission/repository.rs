//! Rate Cap Repository Trait
//!
//! Read-only from the engine's perspective; caps are maintained by account
//! and product administration.

use async_trait::async_trait;

use super::errors::RateCapError;
use super::rate_cap::{RateCap, RateCapOwner};
use crate::domain::shared::ProductId;

/// Repository trait for rate caps.
#[async_trait]
pub trait RateCapRepository: Send + Sync {
    /// Cap for a product and owner, if configured.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find(
        &self,
        product_id: &ProductId,
        owner: &RateCapOwner,
    ) -> Result<Option<RateCap>, RateCapError>;
}
