//! Application wiring.

mod container;

pub use container::{
    CommissionFor, Container, CreateOrderFor, EnginePorts, EngineSettings, InMemoryPorts,
    IngestWebhookFor, IpoBidFor, QueryOrdersFor, ReconcileFor, SubscriptionsFor,
};
