//! Error taxonomy for the order engine.
//!
//! Every use case returns [`EngineError`]. Its [`ErrorCode`] decides the
//! category (validation, not found, external service, partial failure,
//! infrastructure) and the HTTP status the boundary renders.
//!
//! | Category | HTTP | Message shown to caller |
//! |----------|------|-------------------------|
//! | Validation | 400 | specific |
//! | NotFound | 404 | specific |
//! | ExternalService | 503 | generic "unavailable" |
//! | PartialFailure | 502 | specific, with order id and last step |
//! | Infrastructure | 500 | generic "internal error" |

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::{DirectoryError, GatewayError};
use crate::domain::commission::RateCapError;
use crate::domain::order_lifecycle::OrderError;
use crate::domain::subscriptions::SubscriptionError;

/// Generic caller-facing message for gateway failures.
pub const GATEWAY_UNAVAILABLE_MESSAGE: &str = "Execution gateway is unavailable, please retry later";

/// Generic caller-facing message for infrastructure failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Rejected before any state change.
    Validation,
    /// Referenced entity absent.
    NotFound,
    /// Gateway or subscriber unreachable or erroring.
    ExternalService,
    /// Some orchestration steps committed before a later one failed.
    PartialFailure,
    /// Unexpected storage or programming error.
    Infrastructure,
}

/// Error codes for the order engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    /// Malformed request or missing fields.
    InvalidRequest,
    /// Session headers missing.
    MissingSession,
    /// Invalid order parameters.
    InvalidOrderParams,
    /// Invalid webhook subscription.
    InvalidSubscription,
    /// Transition refused by the strict state machine.
    InvalidTransition,

    // Not found
    /// Order not found.
    OrderNotFound,
    /// Customer not found.
    CustomerNotFound,
    /// Product not found.
    ProductNotFound,
    /// IPO batch not found.
    BidNotFound,
    /// No webhook subscription for the account.
    SubscriptionNotFound,

    // External service
    /// Gateway price quote failed.
    PriceUnavailable,
    /// Gateway call failed.
    GatewayUnavailable,
    /// Gateway returned a status outside the known vocabulary.
    UnknownExternalStatus,

    // Partial failure
    /// Orchestration stopped after committing some steps.
    PartialFailure,

    // Infrastructure
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// Category for this code.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest
            | Self::MissingSession
            | Self::InvalidOrderParams
            | Self::InvalidSubscription
            | Self::InvalidTransition => ErrorCategory::Validation,

            Self::OrderNotFound
            | Self::CustomerNotFound
            | Self::ProductNotFound
            | Self::BidNotFound
            | Self::SubscriptionNotFound => ErrorCategory::NotFound,

            Self::PriceUnavailable | Self::GatewayUnavailable | Self::UnknownExternalStatus => {
                ErrorCategory::ExternalService
            }

            Self::PartialFailure => ErrorCategory::PartialFailure,

            Self::InternalError => ErrorCategory::Infrastructure,
        }
    }

    /// HTTP status for this code.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::ExternalService => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::PartialFailure => StatusCode::BAD_GATEWAY,
            ErrorCategory::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::MissingSession => "MISSING_SESSION",
            Self::InvalidOrderParams => "INVALID_ORDER_PARAMS",
            Self::InvalidSubscription => "INVALID_SUBSCRIPTION",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::CustomerNotFound => "CUSTOMER_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::BidNotFound => "BID_NOT_FOUND",
            Self::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            Self::PriceUnavailable => "PRICE_UNAVAILABLE",
            Self::GatewayUnavailable => "GATEWAY_UNAVAILABLE",
            Self::UnknownExternalStatus => "UNKNOWN_EXTERNAL_STATUS",
            Self::PartialFailure => "PARTIAL_FAILURE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A categorized error with caller-safe message and context.
#[derive(Debug, Clone, Error)]
pub struct EngineError {
    code: ErrorCode,
    message: String,
    context: Vec<(String, String)>,
}

impl EngineError {
    /// Create a new error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Caller-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Context pairs.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Context value by key.
    #[must_use]
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Convert to the HTTP error body.
    #[must_use]
    pub fn to_http_response(&self) -> HttpErrorResponse {
        HttpErrorResponse {
            success: false,
            message: self.message.clone(),
            code: self.code.reason().to_string(),
            details: self.context.iter().cloned().collect(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.reason(), self.message)
    }
}

/// HTTP error body: `{success: false, message, code, details}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// Always false.
    pub success: bool,
    /// Caller-facing message.
    pub message: String,
    /// Error code string.
    pub code: String,
    /// Additional details.
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub details: std::collections::BTreeMap<String, String>,
}

/// Convenience constructors for common errors.
impl EngineError {
    /// Request rejected before any state change.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Order not found.
    #[must_use]
    pub fn order_not_found(order_id: &str) -> Self {
        Self::new(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
            .with_context("order_id", order_id)
    }

    /// Gateway failure. `detail` is logged here and never shown to the caller.
    #[must_use]
    pub fn gateway(code: ErrorCode, operation: &str, detail: &GatewayError) -> Self {
        tracing::warn!(operation, error = %detail, "Execution gateway call failed");
        let message = match code {
            ErrorCode::PriceUnavailable => "Price is unavailable for this product".to_string(),
            _ => GATEWAY_UNAVAILABLE_MESSAGE.to_string(),
        };
        Self::new(code, message).with_context("operation", operation)
    }

    /// Orchestration committed up to `last_step` and then failed.
    #[must_use]
    pub fn partial_failure(order_id: &str, last_step: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PartialFailure, message)
            .with_context("order_id", order_id)
            .with_context("last_completed_step", last_step)
    }

    /// Internal error. `detail` is logged here and never shown to the caller.
    #[must_use]
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        Self::new(ErrorCode::InternalError, INTERNAL_ERROR_MESSAGE)
    }
}

impl From<OrderError> for EngineError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidParameters { ref field, .. } => {
                Self::new(ErrorCode::InvalidOrderParams, err.to_string())
                    .with_context("field", field.clone())
            }
            OrderError::InvalidStateTransition { .. } => {
                Self::new(ErrorCode::InvalidTransition, err.to_string())
            }
            OrderError::NotFound { ref order_id } => Self::order_not_found(order_id),
            OrderError::UnknownExternalStatus { ref value } => {
                tracing::warn!(status = %value, "Gateway returned unknown order status");
                Self::new(ErrorCode::UnknownExternalStatus, err.to_string())
                    .with_context("status", value.clone())
            }
            OrderError::ExternalIdImmutable { .. } | OrderError::Storage { .. } => {
                Self::internal(err)
            }
        }
    }
}

impl From<SubscriptionError> for EngineError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::InvalidParameters { ref field, .. } => {
                Self::new(ErrorCode::InvalidSubscription, err.to_string())
                    .with_context("field", field.clone())
            }
            SubscriptionError::Storage { .. } => Self::internal(err),
        }
    }
}

impl From<RateCapError> for EngineError {
    fn from(err: RateCapError) -> Self {
        Self::internal(err)
    }
}

impl From<DirectoryError> for EngineError {
    fn from(err: DirectoryError) -> Self {
        Self::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_lifecycle::OrderStatus;

    #[test]
    fn error_code_http_mapping() {
        assert_eq!(
            ErrorCode::InvalidOrderParams.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::PriceUnavailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ErrorCode::PartialFailure.http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn gateway_detail_is_not_exposed() {
        let err = EngineError::gateway(
            ErrorCode::GatewayUnavailable,
            "create_order",
            &GatewayError::ConnectionError {
                message: "tcp reset by 10.0.0.7".to_string(),
            },
        );

        assert_eq!(err.message(), GATEWAY_UNAVAILABLE_MESSAGE);
        assert!(!err.to_string().contains("10.0.0.7"));
        assert_eq!(err.category(), ErrorCategory::ExternalService);
    }

    #[test]
    fn partial_failure_carries_order_and_step() {
        let err = EngineError::partial_failure("ord-1", "CREDENTIAL_REFRESHED", "Gateway order failed");
        assert_eq!(err.context_value("order_id"), Some("ord-1"));
        assert_eq!(
            err.context_value("last_completed_step"),
            Some("CREDENTIAL_REFRESHED")
        );
    }

    #[test]
    fn order_errors_map_to_categories() {
        let err: EngineError = OrderError::InvalidParameters {
            field: "units".to_string(),
            message: "zero".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err: EngineError = OrderError::InvalidStateTransition {
            from: OrderStatus::OrderProcessed,
            to: OrderStatus::OrderPending,
            reason: "terminal".to_string(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::InvalidTransition);

        let err: EngineError = OrderError::Storage {
            message: "disk full".to_string(),
        }
        .into();
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn http_response_shape() {
        let response = EngineError::order_not_found("ord-9").to_http_response();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "ORDER_NOT_FOUND");
        assert_eq!(json["details"]["order_id"], "ord-9");
    }
}
