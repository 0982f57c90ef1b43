//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::application::dto::{
    CancelIpoBidDto, CommissionSummaryDto, CreateIpoBidDto, CreateOrderDto, DeadLetterDto,
    InboundWebhookDto, IpoBidDto, OrderDto, RegisterSubscriptionDto, Session, SubscriptionDto,
};
use crate::infrastructure::config::{
    CommissionFor, Container, CreateOrderFor, EnginePorts, IngestWebhookFor, IpoBidFor,
    QueryOrdersFor, SubscriptionsFor,
};

use super::request::ListOrdersQuery;
use super::response::{ApiError, ApiResponse, HealthResponse};

type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Application state shared across handlers.
pub struct AppState<P: EnginePorts> {
    /// Single order creation and resume.
    pub create_order: Arc<CreateOrderFor<P>>,
    /// Order reads.
    pub query_orders: Arc<QueryOrdersFor<P>>,
    /// IPO batches.
    pub ipo_bids: Arc<IpoBidFor<P>>,
    /// Inbound gateway events.
    pub ingest_webhook: Arc<IngestWebhookFor<P>>,
    /// Commission reports.
    pub commission: Arc<CommissionFor<P>>,
    /// Outbound webhook subscriptions.
    pub subscriptions: Arc<SubscriptionsFor<P>>,
    /// Application version.
    pub version: String,
}

impl<P: EnginePorts> AppState<P> {
    /// Build every use case from the container.
    pub fn from_container(container: &Container<P>, version: impl Into<String>) -> Self {
        Self {
            create_order: Arc::new(container.create_order_use_case()),
            query_orders: Arc::new(container.query_orders_use_case()),
            ipo_bids: Arc::new(container.ipo_bid_use_case()),
            ingest_webhook: Arc::new(container.ingest_webhook_use_case()),
            commission: Arc::new(container.commission_use_case()),
            subscriptions: Arc::new(container.subscription_use_case()),
            version: version.into(),
        }
    }
}

impl<P: EnginePorts> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            create_order: Arc::clone(&self.create_order),
            query_orders: Arc::clone(&self.query_orders),
            ipo_bids: Arc::clone(&self.ipo_bids),
            ingest_webhook: Arc::clone(&self.ingest_webhook),
            commission: Arc::clone(&self.commission),
            subscriptions: Arc::clone(&self.subscriptions),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<P: EnginePorts>(state: AppState<P>) -> Router {
    Router::new()
        .route("/health", get(health_check::<P>))
        .route(
            "/api/v1/orders",
            post(create_order::<P>).get(list_orders::<P>),
        )
        .route("/api/v1/orders/{id}", get(get_order::<P>))
        .route("/api/v1/orders/{id}/resume", post(resume_order::<P>))
        .route("/api/v1/ipo-bids", post(create_ipo_bid::<P>))
        .route("/api/v1/ipo-bids/{group_id}", get(get_ipo_bid::<P>))
        .route(
            "/api/v1/ipo-bids/{group_id}/confirm",
            post(confirm_ipo_bid::<P>),
        )
        .route(
            "/api/v1/ipo-bids/cancel/{payment_id}",
            post(cancel_ipo_bid::<P>),
        )
        .route("/api/v1/commission/account", get(account_commission::<P>))
        .route("/api/v1/commission/advisor", get(advisor_commission::<P>))
        .route(
            "/api/v1/webhook-subscription",
            get(get_subscription::<P>).put(register_subscription::<P>),
        )
        .route(
            "/api/v1/webhook-subscription/dead-letters",
            get(list_dead_letters::<P>),
        )
        .route("/webhooks/events/{source}", post(receive_webhook::<P>))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<P: EnginePorts>(State(state): State<AppState<P>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

async fn create_order<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    payload: Result<Json<CreateOrderDto>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<OrderDto>), ApiError> {
    let Json(dto) = payload?;
    let order = state.create_order.execute(&session, dto).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(order)))
}

async fn list_orders<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> ApiResult<Vec<OrderDto>> {
    let Query(query) = query?;
    let orders = state.query_orders.list(&session, query.status).await?;
    Ok(ApiResponse::ok(orders))
}

async fn get_order<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<OrderDto> {
    Ok(ApiResponse::ok(state.query_orders.get(&session, &id).await?))
}

async fn resume_order<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<OrderDto> {
    Ok(ApiResponse::ok(state.create_order.resume(&session, &id).await?))
}

async fn create_ipo_bid<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    payload: Result<Json<CreateIpoBidDto>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<IpoBidDto>), ApiError> {
    let Json(dto) = payload?;
    let bid = state.ipo_bids.create(&session, dto).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(bid)))
}

async fn get_ipo_bid<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    Path(group_id): Path<String>,
) -> ApiResult<IpoBidDto> {
    Ok(ApiResponse::ok(state.ipo_bids.get(&session, &group_id).await?))
}

async fn confirm_ipo_bid<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    Path(group_id): Path<String>,
) -> ApiResult<IpoBidDto> {
    Ok(ApiResponse::ok(
        state.ipo_bids.confirm(&session, &group_id).await?,
    ))
}

async fn cancel_ipo_bid<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    Path(payment_id): Path<String>,
) -> ApiResult<CancelIpoBidDto> {
    Ok(ApiResponse::ok(
        state.ipo_bids.cancel(&session, &payment_id).await?,
    ))
}

async fn account_commission<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
) -> ApiResult<CommissionSummaryDto> {
    Ok(ApiResponse::ok(state.commission.account(&session).await?))
}

async fn advisor_commission<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
) -> ApiResult<CommissionSummaryDto> {
    Ok(ApiResponse::ok(state.commission.advisor(&session).await?))
}

async fn register_subscription<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
    payload: Result<Json<RegisterSubscriptionDto>, JsonRejection>,
) -> ApiResult<SubscriptionDto> {
    let Json(dto) = payload?;
    Ok(ApiResponse::ok(
        state.subscriptions.register(&session, dto).await?,
    ))
}

async fn get_subscription<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
) -> ApiResult<SubscriptionDto> {
    Ok(ApiResponse::ok(state.subscriptions.get(&session).await?))
}

async fn list_dead_letters<P: EnginePorts>(
    State(state): State<AppState<P>>,
    session: Session,
) -> ApiResult<Vec<DeadLetterDto>> {
    Ok(ApiResponse::ok(state.subscriptions.dead_letters(&session)))
}

/// Gateway callback. The sender always gets `200` with an empty body.
async fn receive_webhook<P: EnginePorts>(
    State(state): State<AppState<P>>,
    Path(source): Path<String>,
    body: Bytes,
) -> StatusCode {
    let payload: InboundWebhookDto = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(source = %source, error = %e, "Unparseable webhook body dropped");
            return StatusCode::OK;
        }
    };

    let event = payload.event.clone();
    match state.ingest_webhook.execute(&source, payload).await {
        Ok(outcome) => {
            tracing::debug!(source = %source, event = %event, ?outcome, "Webhook handled");
        }
        Err(err) => {
            tracing::error!(source = %source, event = %event, error = %err, "Webhook ingestion failed");
        }
    }
    StatusCode::OK
}
