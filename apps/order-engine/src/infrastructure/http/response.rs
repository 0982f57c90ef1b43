//! HTTP response bodies and error rendering.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorCategory, ErrorCode};

/// Success envelope: `{success: true, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Failure rendered as `{success: false, message, code, details}`.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(EngineError::new(ErrorCode::InvalidRequest, rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(EngineError::new(ErrorCode::InvalidRequest, rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        match err.category() {
            ErrorCategory::Validation | ErrorCategory::NotFound => {
                tracing::debug!(code = err.code().reason(), message = err.message(), "Request rejected");
            }
            ErrorCategory::ExternalService | ErrorCategory::PartialFailure => {
                tracing::warn!(code = err.code().reason(), error = %err, "Request failed");
            }
            ErrorCategory::Infrastructure => {
                tracing::error!(code = err.code().reason(), error = %err, "Request failed");
            }
        }
        (err.code().http_status(), Json(err.to_http_response())).into_response()
    }
}
