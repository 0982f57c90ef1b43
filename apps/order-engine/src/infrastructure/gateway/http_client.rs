//! HTTP client wrapper with retry logic.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::config::ExecutionGatewayConfig;
use super::error::GatewayClientError;
use crate::application::ports::AccessToken;
use crate::resilience::RetryPolicy;

/// HTTP client for the execution gateway.
///
/// Sends the `x-api-key` header on every call and a bearer token on
/// customer-scoped calls. Returns the decoded body only when the gateway
/// reported `success: true`.
#[derive(Debug, Clone)]
pub struct GatewayHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GatewayHttpClient {
    /// Create a new HTTP client from config.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the client cannot be built.
    pub fn new(config: &ExecutionGatewayConfig) -> Result<Self, GatewayClientError> {
        if config.api_key.is_empty() {
            return Err(GatewayClientError::AuthenticationFailed);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayClientError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            retry: config.retry.clone(),
        })
    }

    /// POST a JSON body.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status or `success: false`.
    pub async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        token: Option<&AccessToken>,
        body: &B,
    ) -> Result<Value, GatewayClientError> {
        self.request(Method::POST, path, token, Some(body)).await
    }

    /// GET a resource.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status or `success: false`.
    pub async fn get(
        &self,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<Value, GatewayClientError> {
        self.request(Method::GET, path, token, None::<&()>).await
    }

    async fn request<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
        body: Option<&B>,
    ) -> Result<Value, GatewayClientError> {
        let url = format!("{}{path}", self.base_url);
        let mut backoff = self.retry.backoff();

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("x-api-key", &self.api_key);
            if let Some(token) = token {
                request = request.bearer_auth(token.expose());
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            path,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.retries_done(),
                            "Gateway network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if e.is_timeout() {
                        return Err(GatewayClientError::Timeout);
                    }
                    if backoff.retries_done() > 0 {
                        return Err(GatewayClientError::MaxRetriesExceeded {
                            attempts: backoff.retries_done() + 1,
                        });
                    }
                    return Err(GatewayClientError::Network(e.to_string()));
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| GatewayClientError::Network(e.to_string()))?;
                return parse_envelope(&text);
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            let error_message = error_message(&error_body);

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    if let Some(delay) = backoff.next_backoff() {
                        let delay = retry_after.map_or(delay, Duration::from_secs);
                        tracing::warn!(path, delay_ms = delay.as_millis(), "Gateway rate limited, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(GatewayClientError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            status = status.as_u16(),
                            message = %error_message,
                            path,
                            delay_ms = delay.as_millis(),
                            "Retryable gateway error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(GatewayClientError::Api {
                        status: status.as_u16(),
                        message: error_message,
                    });
                }
                ErrorCategory::NonRetryable => {
                    return match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            Err(GatewayClientError::AuthenticationFailed)
                        }
                        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                            Err(GatewayClientError::Rejected(error_message))
                        }
                        _ => Err(GatewayClientError::Api {
                            status: status.as_u16(),
                            message: error_message,
                        }),
                    };
                }
            }
        }
    }
}

/// Decode a 2xx body and enforce its `success` flag.
fn parse_envelope(text: &str) -> Result<Value, GatewayClientError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| GatewayClientError::JsonParse(e.to_string()))?;

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(value),
        Some(false) => Err(GatewayClientError::Rejected(error_message(text))),
        None => Err(GatewayClientError::JsonParse(
            "response is missing the success flag".to_string(),
        )),
    }
}

/// `message` from a JSON error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
fn categorize_status(status: StatusCode) -> ErrorCategory {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ErrorCategory::RateLimited
    } else if crate::resilience::is_retryable_status(status.as_u16()) {
        ErrorCategory::Retryable
    } else {
        ErrorCategory::NonRetryable
    }
}
