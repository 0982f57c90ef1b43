//! Shared fixtures for use case tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::dto::Session;
use crate::application::ports::{EventPublishError, EventPublisherPort};
use crate::domain::order_lifecycle::{
    CustomerSnapshot, DomainEvent, ProductSnapshot, ProductType,
};
use crate::domain::shared::{AccountId, CustomerId, ForeignId, ProductId, UserId};
use crate::infrastructure::persistence::InMemoryDirectory;

pub const ACCOUNT: &str = "acct-1";
pub const ADVISOR: &str = "adv-1";
pub const CUSTOMER: &str = "cust-1";
pub const CUSTOMER_FOREIGN_ID: &str = "GW-77";
pub const BOND: &str = "prod-bond";
pub const MLD: &str = "prod-mld";
pub const IPO_SERIES_A: &str = "prod-ipo-a";
pub const IPO_SERIES_B: &str = "prod-ipo-b";

pub fn session() -> Session {
    Session::new(ACCOUNT, ADVISOR)
}

fn product(id: &str, code: &str, product_type: ProductType) -> ProductSnapshot {
    ProductSnapshot {
        product_id: ProductId::new(id),
        code: code.to_string(),
        isin: format!("INE-{code}"),
        product_type,
        issuer: "Acme Finance".to_string(),
    }
}

/// Directory with one customer linked to two accounts and four products.
pub fn directory() -> Arc<InMemoryDirectory> {
    let directory = InMemoryDirectory::new();
    directory.add_customer(
        CustomerSnapshot {
            customer_id: CustomerId::new(CUSTOMER),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            demat_number: "IN3000001".to_string(),
            pan: "ABCDE1234F".to_string(),
        },
        Some(ForeignId::new(CUSTOMER_FOREIGN_ID)),
    );
    directory.link_account(CustomerId::new(CUSTOMER), AccountId::new(ACCOUNT));
    directory.link_account(CustomerId::new(CUSTOMER), AccountId::new("acct-2"));

    directory.add_product(product(BOND, "BOND-9", ProductType::Bond));
    directory.add_product(product(MLD, "MLD-3", ProductType::Mld));
    directory.add_product(product(IPO_SERIES_A, "IPO-A", ProductType::Ipo));
    directory.add_product(product(IPO_SERIES_B, "IPO-B", ProductType::Ipo));

    directory.add_reportee(UserId::new(ADVISOR), UserId::new("adv-2"));
    Arc::new(directory)
}

/// Publisher that keeps every event it is handed.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.event_name().to_string())
            .collect()
    }
}

#[async_trait]
impl EventPublisherPort for RecordingPublisher {
    async fn publish_events(&self, events: Vec<DomainEvent>) -> Result<(), EventPublishError> {
        self.events.lock().unwrap().extend(events);
        Ok(())
    }
}
