//! Shared wiring for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use order_engine::application::services::{
    DeadLetterQueue, DeliveryMode, QueuedEventPublisher, WebhookFanoutDispatcher,
};
use order_engine::domain::order_lifecycle::TransitionMode;
use order_engine::infrastructure::config::{Container, EngineSettings, InMemoryPorts};
use order_engine::infrastructure::gateway::MockExecutionGateway;
use order_engine::infrastructure::http::{
    ACCOUNT_ID_HEADER, AppState, USER_ID_HEADER, create_router,
};
use order_engine::infrastructure::persistence::{
    InMemoryDirectory, InMemoryOrderRepository, InMemoryRateCapRepository,
    InMemorySubscriptionRepository, SeedData,
};
use order_engine::infrastructure::webhook::ReqwestWebhookSender;
use order_engine::resilience::RetryPolicy;
use serde_json::Value;
use tower::ServiceExt;

pub const ACCOUNT: &str = "acct-1";
pub const OTHER_ACCOUNT: &str = "acct-2";
pub const ADVISOR: &str = "adv-1";
pub const CUSTOMER: &str = "cust-1";
pub const CUSTOMER_FOREIGN_ID: &str = "GW-77";
pub const BOND: &str = "prod-bond";
pub const MLD: &str = "prod-mld";
pub const IPO_A: &str = "prod-ipo-a";
pub const IPO_B: &str = "prod-ipo-b";

const SEED: &str = r#"
customers:
  - customer_id: cust-1
    foreign_id: GW-77
    name: Asha Rao
    email: asha@example.com
    demat_number: IN3000001
    pan: ABCDE1234F
    accounts: [acct-1, acct-2]
products:
  - product_id: prod-bond
    code: BOND-9
    isin: INE000B01
    product_type: BOND
    issuer: Acme Finance
  - product_id: prod-mld
    code: MLD-3
    isin: INE000M01
    product_type: MLD
    issuer: Acme Finance
  - product_id: prod-ipo-a
    code: IPO-A
    isin: INE000I01
    product_type: IPO
    issuer: Acme Finance
  - product_id: prod-ipo-b
    code: IPO-B
    isin: INE000I02
    product_type: IPO
    issuer: Acme Finance
users:
  - user_id: adv-2
    manager_id: adv-1
rate_caps:
  - product_id: prod-bond
    owner: { kind: account, id: acct-1 }
    max_return_rate: "14"
"#;

pub type Dispatcher =
    WebhookFanoutDispatcher<InMemorySubscriptionRepository, ReqwestWebhookSender>;
pub type Ports = InMemoryPorts<MockExecutionGateway, QueuedEventPublisher>;

/// A fully wired engine over the mock gateway and real webhook delivery.
///
/// Deliveries run on the background worker; call [`TestEngine::flush`]
/// before asserting on what subscribers received.
pub struct TestEngine {
    pub gateway: Arc<MockExecutionGateway>,
    pub dispatcher: Arc<Dispatcher>,
    pub publisher: Arc<QueuedEventPublisher>,
    pub dead_letters: Arc<DeadLetterQueue>,
    pub container: Container<Ports>,
    pub router: Router,
}

/// Engine options.
pub struct Options {
    pub transition_mode: TransitionMode,
    pub delivery_mode: DeliveryMode,
    pub delivery_retry: RetryPolicy,
    pub gateway: MockExecutionGateway,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            transition_mode: TransitionMode::Compatibility,
            delivery_mode: DeliveryMode::FailFast,
            delivery_retry: RetryPolicy::no_retry(),
            gateway: MockExecutionGateway::new(),
        }
    }
}

pub fn engine(options: Options) -> TestEngine {
    let directory = Arc::new(InMemoryDirectory::new());
    let rate_caps = Arc::new(InMemoryRateCapRepository::new());
    SeedData::from_yaml(SEED)
        .unwrap()
        .apply(&directory, &rate_caps);

    let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
    let dead_letters = Arc::new(DeadLetterQueue::default());
    let dispatcher = Arc::new(WebhookFanoutDispatcher::new(
        Arc::clone(&subscriptions),
        Arc::new(ReqwestWebhookSender::new(None).unwrap()),
        options.delivery_mode,
        options.delivery_retry,
        Arc::clone(&dead_letters),
    ));
    let (publisher, _worker) = QueuedEventPublisher::spawn(Arc::clone(&dispatcher), 64);
    let publisher = Arc::new(publisher);
    let gateway = Arc::new(options.gateway);

    let container = Container::<Ports>::new(
        Arc::clone(&gateway),
        Arc::new(InMemoryOrderRepository::new()),
        rate_caps,
        subscriptions,
        directory,
        Arc::clone(&publisher),
        EngineSettings {
            transition_mode: options.transition_mode,
            consent_base_url: "https://consent.test/ipo".to_string(),
        },
    )
    .with_dead_letters(Arc::clone(&dead_letters));
    let router = create_router(AppState::from_container(&container, "test"));

    TestEngine {
        gateway,
        dispatcher,
        publisher,
        dead_letters,
        container,
        router,
    }
}

impl TestEngine {
    /// Wait for every queued webhook delivery to finish.
    pub async fn flush(&self) {
        self.publisher.flush().await;
    }

    /// Call an API route as `account`/`adv-1`.
    pub async fn call_as(
        &self,
        account: &str,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACCOUNT_ID_HEADER, account)
            .header(USER_ID_HEADER, ADVISOR)
            .header("content-type", "application/json");
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        self.send(builder.body(body).unwrap()).await
    }

    /// Call an API route as the default account.
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call_as(ACCOUNT, method, uri, body).await
    }

    /// Deliver a gateway callback.
    pub async fn gateway_event(&self, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/events/gateway")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
