//! Dependency Injection Container
//!
//! Manages creation and wiring of all application components.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::application::ports::{DirectoryPort, EventPublisherPort, ExecutionGatewayPort};
use crate::application::services::DeadLetterQueue;
use crate::application::use_cases::{
    CalculateCommissionUseCase, CreateOrderUseCase, IngestWebhookUseCase, IpoBidUseCase,
    ManageSubscriptionUseCase, QueryOrdersUseCase, ReconcileOrdersUseCase,
};
use crate::config::Config;
use crate::domain::commission::RateCapRepository;
use crate::domain::order_lifecycle::{OrderRepository, TransitionMode};
use crate::domain::subscriptions::SubscriptionRepository;
use crate::infrastructure::persistence::{
    InMemoryDirectory, InMemoryOrderRepository, InMemoryRateCapRepository,
    InMemorySubscriptionRepository,
};

/// The set of adapters an engine runs on.
///
/// One type names every port implementation so the container, the HTTP
/// state and the handlers carry a single generic parameter.
pub trait EnginePorts: Send + Sync + 'static {
    /// Execution gateway.
    type Gateway: ExecutionGatewayPort + 'static;
    /// Order rows.
    type Orders: OrderRepository + 'static;
    /// Spread caps.
    type RateCaps: RateCapRepository + 'static;
    /// Webhook subscriptions.
    type Subscriptions: SubscriptionRepository + 'static;
    /// Customers, products and the advisor hierarchy.
    type Directory: DirectoryPort + 'static;
    /// Outbound event sink.
    type Publisher: EventPublisherPort + 'static;
}

/// In-memory repositories with a chosen gateway and publisher.
pub struct InMemoryPorts<G, E>(PhantomData<fn() -> (G, E)>);

impl<G, E> EnginePorts for InMemoryPorts<G, E>
where
    G: ExecutionGatewayPort + 'static,
    E: EventPublisherPort + 'static,
{
    type Gateway = G;
    type Orders = InMemoryOrderRepository;
    type RateCaps = InMemoryRateCapRepository;
    type Subscriptions = InMemorySubscriptionRepository;
    type Directory = InMemoryDirectory;
    type Publisher = E;
}

/// `CreateOrderUseCase` over a port set.
pub type CreateOrderFor<P> = CreateOrderUseCase<
    <P as EnginePorts>::Gateway,
    <P as EnginePorts>::Orders,
    <P as EnginePorts>::Directory,
    <P as EnginePorts>::Publisher,
>;
/// `QueryOrdersUseCase` over a port set.
pub type QueryOrdersFor<P> =
    QueryOrdersUseCase<<P as EnginePorts>::Orders, <P as EnginePorts>::Directory>;
/// `IpoBidUseCase` over a port set.
pub type IpoBidFor<P> = IpoBidUseCase<
    <P as EnginePorts>::Gateway,
    <P as EnginePorts>::Orders,
    <P as EnginePorts>::Directory,
    <P as EnginePorts>::Publisher,
>;
/// `IngestWebhookUseCase` over a port set.
pub type IngestWebhookFor<P> = IngestWebhookUseCase<
    <P as EnginePorts>::Orders,
    <P as EnginePorts>::Directory,
    <P as EnginePorts>::Publisher,
>;
/// `CalculateCommissionUseCase` over a port set.
pub type CommissionFor<P> =
    CalculateCommissionUseCase<<P as EnginePorts>::Orders, <P as EnginePorts>::RateCaps>;
/// `ManageSubscriptionUseCase` over a port set.
pub type SubscriptionsFor<P> = ManageSubscriptionUseCase<<P as EnginePorts>::Subscriptions>;
/// `ReconcileOrdersUseCase` over a port set.
pub type ReconcileFor<P> = ReconcileOrdersUseCase<
    <P as EnginePorts>::Gateway,
    <P as EnginePorts>::Orders,
    <P as EnginePorts>::Publisher,
>;

/// Behavior switches the use cases are built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Mode for externally sourced status updates.
    pub transition_mode: TransitionMode,
    /// Base of IPO consent links.
    pub consent_base_url: String,
}

impl EngineSettings {
    /// Take the settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            transition_mode: config.state_machine.mode,
            consent_base_url: config.ipo.consent_base_url.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Dependency injection container.
///
/// Holds all wired dependencies for the application.
pub struct Container<P: EnginePorts> {
    // Ports
    gateway: Arc<P::Gateway>,
    order_repo: Arc<P::Orders>,
    rate_caps: Arc<P::RateCaps>,
    subscriptions: Arc<P::Subscriptions>,
    directory: Arc<P::Directory>,
    event_publisher: Arc<P::Publisher>,
    dead_letters: Arc<DeadLetterQueue>,

    settings: EngineSettings,
}

impl<P: EnginePorts> Container<P> {
    /// Create a new container with all dependencies.
    ///
    /// Starts with an empty dead-letter queue of default capacity; use
    /// [`Container::with_dead_letters`] to share the publisher's queue.
    pub fn new(
        gateway: Arc<P::Gateway>,
        order_repo: Arc<P::Orders>,
        rate_caps: Arc<P::RateCaps>,
        subscriptions: Arc<P::Subscriptions>,
        directory: Arc<P::Directory>,
        event_publisher: Arc<P::Publisher>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            gateway,
            order_repo,
            rate_caps,
            subscriptions,
            directory,
            event_publisher,
            dead_letters: Arc::new(DeadLetterQueue::default()),
            settings,
        }
    }

    /// Use `dead_letters` as the queue read back through the API.
    #[must_use]
    pub fn with_dead_letters(mut self, dead_letters: Arc<DeadLetterQueue>) -> Self {
        self.dead_letters = dead_letters;
        self
    }

    /// Behavior switches.
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Get the execution gateway.
    pub fn gateway(&self) -> Arc<P::Gateway> {
        Arc::clone(&self.gateway)
    }

    /// Get the order repository.
    pub fn order_repo(&self) -> Arc<P::Orders> {
        Arc::clone(&self.order_repo)
    }

    /// Get the event publisher.
    pub fn event_publisher(&self) -> Arc<P::Publisher> {
        Arc::clone(&self.event_publisher)
    }

    /// Get the dead-letter queue.
    pub fn dead_letters(&self) -> Arc<DeadLetterQueue> {
        Arc::clone(&self.dead_letters)
    }

    /// Create a `CreateOrderUseCase`.
    pub fn create_order_use_case(&self) -> CreateOrderFor<P> {
        CreateOrderUseCase::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.order_repo),
            Arc::clone(&self.directory),
            Arc::clone(&self.event_publisher),
        )
    }

    /// Create a `QueryOrdersUseCase`.
    pub fn query_orders_use_case(&self) -> QueryOrdersFor<P> {
        QueryOrdersUseCase::new(Arc::clone(&self.order_repo), Arc::clone(&self.directory))
    }

    /// Create an `IpoBidUseCase`.
    pub fn ipo_bid_use_case(&self) -> IpoBidFor<P> {
        IpoBidUseCase::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.order_repo),
            Arc::clone(&self.directory),
            Arc::clone(&self.event_publisher),
            self.settings.consent_base_url.clone(),
            self.settings.transition_mode,
        )
    }

    /// Create an `IngestWebhookUseCase`.
    pub fn ingest_webhook_use_case(&self) -> IngestWebhookFor<P> {
        IngestWebhookUseCase::new(
            Arc::clone(&self.order_repo),
            Arc::clone(&self.directory),
            Arc::clone(&self.event_publisher),
            self.settings.transition_mode,
        )
    }

    /// Create a `CalculateCommissionUseCase`.
    pub fn commission_use_case(&self) -> CommissionFor<P> {
        CalculateCommissionUseCase::new(Arc::clone(&self.order_repo), Arc::clone(&self.rate_caps))
    }

    /// Create a `ManageSubscriptionUseCase`.
    pub fn subscription_use_case(&self) -> SubscriptionsFor<P> {
        ManageSubscriptionUseCase::new(
            Arc::clone(&self.subscriptions),
            Arc::clone(&self.dead_letters),
        )
    }

    /// Create a `ReconcileOrdersUseCase`.
    pub fn reconcile_use_case(&self) -> ReconcileFor<P> {
        ReconcileOrdersUseCase::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.order_repo),
            Arc::clone(&self.event_publisher),
            self.settings.transition_mode,
        )
    }
}
