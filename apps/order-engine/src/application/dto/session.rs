//! Authenticated session context.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{AccountId, UserId};

/// Caller identity supplied by the upstream authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Tenant account the request acts on.
    pub account_id: AccountId,
    /// Advisor making the request.
    pub user_id: UserId,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub fn new(account_id: impl Into<AccountId>, user_id: impl Into<UserId>) -> Self {
        Self {
            account_id: account_id.into(),
            user_id: user_id.into(),
        }
    }
}
