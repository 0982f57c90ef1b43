//! Persistence configuration.

use serde::{Deserialize, Serialize};

/// Persistence configuration.
///
/// Repositories are in memory; reference data can be seeded from YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Seed file with customers, products, hierarchy and rate caps.
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl PersistenceConfig {
    /// Seed file path, treating an empty string as unset.
    #[must_use]
    pub fn seed_file(&self) -> Option<&str> {
        self.seed_file.as_deref().filter(|path| !path.trim().is_empty())
    }
}
