//! Order lifecycle settings: transition mode and IPO consent links.

use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::TransitionMode;

/// State machine configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StateMachineConfig {
    /// `compatibility` (overwrite) or `strict` (transition table).
    #[serde(default)]
    pub mode: TransitionMode,
}

/// IPO batch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpoConfig {
    /// Consent URLs are `{consent_base_url}/{group_id}`.
    #[serde(default = "default_consent_base_url")]
    pub consent_base_url: String,
}

impl Default for IpoConfig {
    fn default() -> Self {
        Self {
            consent_base_url: default_consent_base_url(),
        }
    }
}

fn default_consent_base_url() -> String {
    "http://localhost:8080/consent/ipo".to_string()
}
