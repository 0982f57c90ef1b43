//! Order Engine Binary
//!
//! Starts the order lifecycle engine: the REST API, the gateway callback
//! endpoint and, when enabled, the timeline reconciliation loop.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-engine
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_ENGINE_CONFIG`: Path to the YAML config (default: `config.yaml`)
//! - `RUST_LOG`: Overrides the configured log level
//!
//! Values referenced from the config as `${VAR}` or `${VAR:-default}` are
//! read from the environment, including a `.env` file when present.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use order_engine::application::ports::{EventPublisherPort, ExecutionGatewayPort};
use order_engine::application::services::{
    DeadLetterQueue, QueuedEventPublisher, WebhookFanoutDispatcher,
};
use order_engine::application::use_cases::ReconcileOrdersUseCase;
use order_engine::config::{CONFIG_PATH_ENV, Config, GatewaySettings, load_config};
use order_engine::domain::order_lifecycle::OrderRepository;
use order_engine::infrastructure::config::{Container, EngineSettings, InMemoryPorts};
use order_engine::infrastructure::gateway::{
    ExecutionGatewayConfig, HttpExecutionGateway, MockExecutionGateway,
};
use order_engine::infrastructure::http::{AppState, create_router};
use order_engine::infrastructure::persistence::{
    InMemoryDirectory, InMemoryOrderRepository, InMemoryRateCapRepository,
    InMemorySubscriptionRepository, SeedData,
};
use order_engine::infrastructure::webhook::ReqwestWebhookSender;
use order_engine::observability::{MetricsConfig, init_metrics, init_tracing};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Time allowed for an in-flight reconciliation sweep, and then for queued
/// webhook deliveries, after shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Fan-out to tenant subscribers over HTTP, run by the delivery worker.
type Dispatcher = WebhookFanoutDispatcher<InMemorySubscriptionRepository, ReqwestWebhookSender>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    init_tracing(
        &config.observability.logging.level,
        config.observability.logging.format,
    );
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting order engine");

    start_metrics(&config)?;

    let directory = Arc::new(InMemoryDirectory::new());
    let rate_caps = Arc::new(InMemoryRateCapRepository::new());
    if let Some(path) = config.persistence.seed_file() {
        SeedData::from_file(path)
            .with_context(|| format!("Failed to load seed file '{path}'"))?
            .apply(&directory, &rate_caps);
        tracing::info!(path, "Seed data loaded");
    }

    if let Some(base_url) = config.gateway.base_url() {
        let gateway = HttpExecutionGateway::new(&gateway_config(&config.gateway, base_url))?;
        tracing::info!(base_url, "HTTP execution gateway initialized");
        serve(config, Arc::new(gateway), directory, rate_caps).await
    } else {
        tracing::warn!("No gateway base_url configured, using the in-process mock gateway");
        serve(config, Arc::new(MockExecutionGateway::new()), directory, rate_caps).await
    }
}

/// Wire the container around `gateway` and run until a shutdown signal.
async fn serve<G>(
    config: Config,
    gateway: Arc<G>,
    directory: Arc<InMemoryDirectory>,
    rate_caps: Arc<InMemoryRateCapRepository>,
) -> anyhow::Result<()>
where
    G: ExecutionGatewayPort + 'static,
{
    let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
    let sender = Arc::new(ReqwestWebhookSender::new(config.webhooks.timeout())?);
    let dead_letters = Arc::new(DeadLetterQueue::new(config.webhooks.dead_letter_capacity));
    let dispatcher: Arc<Dispatcher> = Arc::new(WebhookFanoutDispatcher::new(
        Arc::clone(&subscriptions),
        sender,
        config.webhooks.delivery_mode,
        config.webhooks.retry.clone(),
        Arc::clone(&dead_letters),
    ));
    let (publisher, _delivery_worker) =
        QueuedEventPublisher::spawn(dispatcher, config.webhooks.queue_capacity);
    let publisher = Arc::new(publisher);

    let settings = EngineSettings::from_config(&config);
    tracing::info!(
        transition_mode = ?settings.transition_mode,
        delivery_mode = ?config.webhooks.delivery_mode,
        queue_capacity = config.webhooks.queue_capacity,
        dead_letter_capacity = config.webhooks.dead_letter_capacity,
        "Engine configured"
    );

    let container = Container::<InMemoryPorts<G, QueuedEventPublisher>>::new(
        gateway,
        Arc::new(InMemoryOrderRepository::new()),
        rate_caps,
        subscriptions,
        directory,
        Arc::clone(&publisher),
        settings,
    )
    .with_dead_letters(dead_letters);

    let shutdown_token = CancellationToken::new();
    let reconciler = config.reconciliation.enabled.then(|| {
        spawn_reconciler(
            Arc::new(container.reconcile_use_case()),
            config.reconciliation.interval(),
            shutdown_token.clone(),
        )
    });

    let app = create_router(AppState::from_container(
        &container,
        env!("CARGO_PKG_VERSION"),
    ));

    let http_addr: SocketAddr = format!(
        "{}:{}",
        config.server.bind_address, config.server.http_port
    )
    .parse()
    .context("Invalid server bind address")?;

    let listener = TcpListener::bind(http_addr).await?;
    tracing::info!(%http_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_token.cancel();
    if let Some(handle) = reconciler
        && tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await.is_err()
    {
        tracing::warn!("Reconciliation loop did not stop in time");
    }

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, publisher.flush())
        .await
        .is_err()
    {
        tracing::warn!("Queued webhook deliveries did not drain in time");
    }

    tracing::info!("Order engine stopped");
    Ok(())
}

fn gateway_config(settings: &GatewaySettings, base_url: &str) -> ExecutionGatewayConfig {
    let config = ExecutionGatewayConfig::new(base_url, settings.api_key.clone())
        .with_retry(settings.retry.clone());
    match settings.timeout_ms {
        Some(ms) => config.with_timeout(Duration::from_millis(ms)),
        None => config,
    }
}

fn start_metrics(config: &Config) -> anyhow::Result<()> {
    let Some(addr) = config
        .observability
        .metrics_addr
        .as_deref()
        .filter(|addr| !addr.trim().is_empty())
    else {
        return Ok(());
    };
    let addr: SocketAddr = addr.parse().context("Invalid metrics_addr")?;
    init_metrics(&MetricsConfig::with_addr(addr))?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Run a reconciliation sweep every `interval` until `shutdown` fires.
fn spawn_reconciler<G, O, E>(
    use_case: Arc<ReconcileOrdersUseCase<G, O, E>>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    G: ExecutionGatewayPort + 'static,
    O: OrderRepository + 'static,
    E: EventPublisherPort + 'static,
{
    tracing::info!(interval_ms = interval.as_millis(), "Starting reconciliation loop");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; sweeps start one interval in.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::info!("Reconciliation loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = use_case.execute().await {
                        tracing::error!(error = %e, "Reconciliation sweep failed");
                    }
                }
            }
        }
    })
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// A handler that cannot be installed never fires; the other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
