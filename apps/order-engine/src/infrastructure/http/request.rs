//! HTTP request types and the session extractor.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use serde::{Deserialize, Serialize};

use crate::application::dto::Session;
use crate::domain::order_lifecycle::OrderStatus;
use crate::domain::shared::{AccountId, UserId};
use crate::error::{EngineError, ErrorCode};

use super::response::ApiError;

/// Header carrying the tenant account id.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// Header carrying the advisor's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Query string of `GET /api/v1/orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOrdersQuery {
    /// Only orders in this status.
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// The upstream authenticator forwards the caller as two headers.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account_id = header_value(&parts.headers, ACCOUNT_ID_HEADER);
        let user_id = header_value(&parts.headers, USER_ID_HEADER);

        match (account_id, user_id) {
            (Some(account_id), Some(user_id)) => {
                Ok(Self::new(AccountId::new(account_id), UserId::new(user_id)))
            }
            _ => Err(EngineError::new(
                ErrorCode::MissingSession,
                format!("Headers {ACCOUNT_ID_HEADER} and {USER_ID_HEADER} are required"),
            )
            .into()),
        }
    }
}
