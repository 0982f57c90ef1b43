//! Outbound webhook delivery over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::application::ports::{WebhookDelivery, WebhookSendError, WebhookSenderPort};
use crate::domain::subscriptions::DeliveryMethod;

/// Sends webhook envelopes as JSON. Any non-2xx status is a failure.
#[derive(Debug, Clone)]
pub struct ReqwestWebhookSender {
    client: Client,
}

impl ReqwestWebhookSender {
    /// Create a sender; `timeout` of `None` keeps the transport default.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>) -> Result<Self, WebhookSendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| WebhookSendError::Transport {
            message: e.to_string(),
        })?;
        Ok(Self { client })
    }
}

fn to_method(method: DeliveryMethod) -> Method {
    match method {
        DeliveryMethod::Post => Method::POST,
        DeliveryMethod::Put => Method::PUT,
        DeliveryMethod::Patch => Method::PATCH,
    }
}

#[async_trait]
impl WebhookSenderPort for ReqwestWebhookSender {
    async fn send(&self, delivery: &WebhookDelivery) -> Result<(), WebhookSendError> {
        let response = self
            .client
            .request(to_method(delivery.method), &delivery.url)
            .json(&delivery.body)
            .send()
            .await
            .map_err(|e| WebhookSendError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookSendError::HttpStatus {
                status: status.as_u16(),
            });
        }

        tracing::debug!(url = %delivery.url, event = %delivery.body.event, "Webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::WebhookEnvelope;
    use crate::domain::order_lifecycle::{DomainEvent, OrderStatus, OrderStatusChanged};
    use crate::domain::shared::{AccountId, OrderId, Timestamp};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn delivery(url: String, delivery_method: DeliveryMethod) -> WebhookDelivery {
        WebhookDelivery {
            url,
            method: delivery_method,
            body: WebhookEnvelope {
                event: "orderProcessed".to_string(),
                payload: DomainEvent::OrderStatusChanged(OrderStatusChanged {
                    order_id: OrderId::new("o-1"),
                    previous_status: OrderStatus::DigioSignSuccess,
                    new_status: OrderStatus::OrderProcessed,
                    account_id: AccountId::new("a1"),
                    event: "orderProcessed".to_string(),
                    occurred_at: Timestamp::now(),
                }),
            },
        }
    }

    #[tokio::test]
    async fn delivers_envelope_with_registered_method() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/hook"))
            .and(body_partial_json(serde_json::json!({
                "event": "orderProcessed",
                "payload": { "order_id": "o-1", "new_status": "ORDER_PROCESSED" }
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sender = ReqwestWebhookSender::new(None).unwrap();
        sender
            .send(&delivery(format!("{}/hook", server.uri()), DeliveryMethod::Put))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sender = ReqwestWebhookSender::new(Some(Duration::from_secs(5))).unwrap();
        let result = sender
            .send(&delivery(format!("{}/hook", server.uri()), DeliveryMethod::Post))
            .await;

        assert!(matches!(result, Err(WebhookSendError::HttpStatus { status: 500 })));
    }
}
