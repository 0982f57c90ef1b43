//! HTTP execution gateway adapter against a stub gateway.

use order_engine::application::ports::{
    AccessToken, ExecutionGatewayPort, GatewayError, GatewayOrderRequest, PriceRequest,
};
use order_engine::domain::shared::{CustomerId, ExternalOrderId, OrderId};
use order_engine::infrastructure::gateway::{ExecutionGatewayConfig, HttpExecutionGateway};
use order_engine::resilience::RetryPolicy;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn gateway(server: &MockServer) -> HttpExecutionGateway {
    HttpExecutionGateway::new(&ExecutionGatewayConfig::new(server.uri(), API_KEY)).unwrap()
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        multiplier: 2.0,
        jitter_factor: 0.0,
    }
}

#[tokio::test]
async fn price_quote_sends_api_key_and_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/price"))
        .and(header("x-api-key", API_KEY))
        .and(body_json(json!({"productCode": "BOND-9", "units": 10, "returnRate": "12"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "unitPrice": 1000,
            "userAmount": "10000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let quote = gateway(&server)
        .get_price(&PriceRequest {
            product_code: "BOND-9".to_string(),
            units: 10,
            return_rate: Decimal::new(12, 0),
        })
        .await
        .unwrap();

    assert_eq!(quote.unit_price, Decimal::new(1000, 0));
    assert_eq!(quote.user_amount, Decimal::new(10_000, 0));
}

#[tokio::test]
async fn success_false_body_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Product closed for subscription"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .get_price(&PriceRequest {
            product_code: "BOND-9".to_string(),
            units: 1,
            return_rate: Decimal::ONE,
        })
        .await
        .unwrap_err();

    assert!(
        matches!(&err, GatewayError::Rejected { reason } if reason.contains("closed")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn create_order_uses_bearer_token_and_keeps_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "orderId": "EXT-9",
            "foreignId": "GW-77",
            "venue": "NSE"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = gateway(&server)
        .create_order(&GatewayOrderRequest {
            token: AccessToken::new("tok-1"),
            reference: OrderId::new("ord-1"),
            customer_id: CustomerId::new("cust-1"),
            demat_number: "IN3000001".to_string(),
            product_code: "BOND-9".to_string(),
            isin: "INE-BOND-9".to_string(),
            units: 10,
            unit_price: Decimal::new(1000, 0),
            return_rate: Decimal::new(12, 0),
        })
        .await
        .unwrap();

    assert_eq!(ack.external_order_id, ExternalOrderId::new("EXT-9"));
    assert_eq!(ack.payload["venue"], "NSE");
}

#[tokio::test]
async fn cancellation_returns_status_entries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders/EXT-1/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "orders": [
                {"orderId": "EXT-1", "status": "cancelled"},
                {"orderId": "EXT-2", "status": "cancelled", "transactionId": "TXN-2"}
            ]
        })))
        .mount(&server)
        .await;

    let entries = gateway(&server)
        .cancel_order(&ExternalOrderId::new("EXT-1"), &AccessToken::new("tok"))
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].order_id, ExternalOrderId::new("EXT-2"));
    assert_eq!(entries[1].status, "cancelled");
    assert!(entries[1].transaction_id.is_some());
}

#[tokio::test]
async fn server_errors_are_retried_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/products/BOND-9/timeline"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/products/BOND-9/timeline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "orders": [{"orderId": "EXT-1", "status": "ORDER_PROCESSED"}]
        })))
        .mount(&server)
        .await;

    let config = ExecutionGatewayConfig::new(server.uri(), API_KEY).with_retry(fast_retry(3));
    let entries = HttpExecutionGateway::new(&config)
        .unwrap()
        .get_transaction_timeline("BOND-9", &AccessToken::new("tok"))
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn server_errors_are_not_retried_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/customers/cust-1/token"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = gateway(&server)
        .refresh_access_token(&CustomerId::new("cust-1"))
        .await
        .unwrap_err();

    assert!(!matches!(err, GatewayError::Rejected { .. }));
}
