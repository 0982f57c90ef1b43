//! Persistence Adapters
//!
//! In-memory implementations of the repository traits and the directory
//! port, plus the YAML seed loader that fills them at startup.

pub mod directory;
pub mod in_memory;
pub mod seed;

pub use directory::InMemoryDirectory;
pub use in_memory::{
    InMemoryOrderRepository, InMemoryRateCapRepository, InMemorySubscriptionRepository,
};
pub use seed::{SeedData, SeedError};
