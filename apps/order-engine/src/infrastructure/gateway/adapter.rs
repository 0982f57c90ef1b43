//! HTTP execution gateway adapter implementing `ExecutionGatewayPort`.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::api_types::{
    CreateOrderBody, CreateOrderResponse, EsignBody, EsignResponse, OrderStatusListResponse,
    PriceRequestBody, PriceResponse, TokenResponse,
};
use super::config::ExecutionGatewayConfig;
use super::error::GatewayClientError;
use super::http_client::GatewayHttpClient;
use crate::application::ports::{
    AccessToken, ExecutionGatewayPort, ExternalStatusEntry, GatewayError, GatewayOrderAck,
    GatewayOrderRequest, PriceQuote, PriceRequest,
};
use crate::domain::shared::{CustomerId, ExternalOrderId, ForeignId};
use crate::observability::record_gateway_call;

/// Execution gateway adapter over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpExecutionGateway {
    client: GatewayHttpClient,
}

impl HttpExecutionGateway {
    /// Create a new adapter.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &ExecutionGatewayConfig) -> Result<Self, GatewayClientError> {
        Ok(Self {
            client: GatewayHttpClient::new(config)?,
        })
    }
}

/// Run a gateway call, recording its outcome and latency.
async fn timed<T, F>(operation: &'static str, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayClientError>>,
{
    let started = Instant::now();
    let result = call.await;
    let outcome = if result.is_ok() { "ok" } else { "error" };
    record_gateway_call(operation, outcome, started.elapsed().as_secs_f64());

    result.map_err(|e| {
        tracing::debug!(operation, error = %e, "Gateway call failed");
        GatewayError::from(e)
    })
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GatewayClientError> {
    serde_json::from_value(value).map_err(|e| GatewayClientError::JsonParse(e.to_string()))
}

#[async_trait]
impl ExecutionGatewayPort for HttpExecutionGateway {
    async fn get_price(&self, request: &PriceRequest) -> Result<PriceQuote, GatewayError> {
        let body = PriceRequestBody {
            product_code: &request.product_code,
            units: request.units,
            return_rate: request.return_rate,
        };

        timed("get_price", async {
            let value = self.client.post("/v1/price", None, &body).await?;
            decode::<PriceResponse>(value).map(PriceQuote::from)
        })
        .await
    }

    async fn refresh_access_token(
        &self,
        customer_id: &CustomerId,
    ) -> Result<AccessToken, GatewayError> {
        let path = format!("/v1/customers/{customer_id}/token");

        timed("refresh_access_token", async {
            let value = self.client.post(&path, None, &serde_json::json!({})).await?;
            decode::<TokenResponse>(value).map(|t| AccessToken::new(t.access_token))
        })
        .await
    }

    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrderAck, GatewayError> {
        let body = CreateOrderBody {
            reference_id: request.reference.as_str(),
            customer_id: request.customer_id.as_str(),
            demat_number: &request.demat_number,
            product_code: &request.product_code,
            isin: &request.isin,
            units: request.units,
            unit_price: request.unit_price,
            return_rate: request.return_rate,
        };

        tracing::info!(
            reference = %request.reference,
            product_code = %request.product_code,
            units = request.units,
            "Placing order with gateway"
        );

        timed("create_order", async {
            let value = self
                .client
                .post("/v1/orders", Some(&request.token), &body)
                .await?;
            let parsed = decode::<CreateOrderResponse>(value.clone())?;
            Ok(GatewayOrderAck {
                external_order_id: ExternalOrderId::new(parsed.order_id),
                foreign_id: parsed.foreign_id.map(ForeignId::new),
                payload: value,
            })
        })
        .await
    }

    async fn get_esigning_url(
        &self,
        order_id: &ExternalOrderId,
        pan: &str,
        email: &str,
    ) -> Result<String, GatewayError> {
        let path = format!("/v1/orders/{order_id}/esign");
        let body = EsignBody { pan, email };

        timed("get_esigning_url", async {
            let value = self.client.post(&path, None, &body).await?;
            decode::<EsignResponse>(value).map(|r| r.signing_url)
        })
        .await
    }

    async fn cancel_order(
        &self,
        order_id: &ExternalOrderId,
        token: &AccessToken,
    ) -> Result<Vec<ExternalStatusEntry>, GatewayError> {
        let path = format!("/v1/orders/{order_id}/cancel");

        timed("cancel_order", async {
            let value = self
                .client
                .post(&path, Some(token), &serde_json::json!({}))
                .await?;
            decode::<OrderStatusListResponse>(value)
                .map(|r| r.orders.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn get_transaction_timeline(
        &self,
        product_code: &str,
        token: &AccessToken,
    ) -> Result<Vec<ExternalStatusEntry>, GatewayError> {
        let path = format!("/v1/products/{product_code}/timeline");

        timed("get_transaction_timeline", async {
            let value = self.client.get(&path, Some(token)).await?;
            decode::<OrderStatusListResponse>(value)
                .map(|r| r.orders.into_iter().map(Into::into).collect())
        })
        .await
    }
}
