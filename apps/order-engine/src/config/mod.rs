//! Configuration module for the order engine.
//!
//! Loads a YAML file with environment variable interpolation and validates
//! it before anything is wired.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod gateway;
mod lifecycle;
mod observability;
mod persistence;
mod reconciliation;
mod server;
mod webhooks;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gateway::GatewaySettings;
pub use lifecycle::{IpoConfig, StateMachineConfig};
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use persistence::PersistenceConfig;
pub use reconciliation::ReconciliationConfig;
pub use server::ServerConfig;
pub use webhooks::WebhooksConfig;

use crate::resilience::RetryPolicy;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "ORDER_ENGINE_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Execution gateway settings.
    #[serde(default)]
    pub gateway: GatewaySettings,
    /// Transition mode.
    #[serde(default)]
    pub state_machine: StateMachineConfig,
    /// Outbound webhook delivery.
    #[serde(default)]
    pub webhooks: WebhooksConfig,
    /// IPO consent links.
    #[serde(default)]
    pub ipo: IpoConfig,
    /// Periodic timeline reconciliation.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Persistence and seeding.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == 0 {
        return Err(ConfigError::ValidationError(
            "server.http_port must be non-zero".to_string(),
        ));
    }

    if let Some(url) = config.gateway.base_url() {
        if !is_http_url(url) {
            return Err(ConfigError::ValidationError(
                "gateway.base_url must be an http(s) URL".to_string(),
            ));
        }
        if config.gateway.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gateway.api_key is required when gateway.base_url is set".to_string(),
            ));
        }
    }

    validate_retry("gateway.retry", &config.gateway.retry)?;
    validate_retry("webhooks.retry", &config.webhooks.retry)?;

    if config.webhooks.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "webhooks.queue_capacity must be at least 1".to_string(),
        ));
    }
    if config.webhooks.dead_letter_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "webhooks.dead_letter_capacity must be at least 1".to_string(),
        ));
    }

    if !is_http_url(&config.ipo.consent_base_url) {
        return Err(ConfigError::ValidationError(
            "ipo.consent_base_url must be an http(s) URL".to_string(),
        ));
    }

    if config.reconciliation.enabled && config.reconciliation.interval_ms < 1_000 {
        return Err(ConfigError::ValidationError(
            "reconciliation.interval_ms must be at least 1000".to_string(),
        ));
    }

    if let Some(addr) = &config.observability.metrics_addr
        && !addr.is_empty()
        && addr.parse::<std::net::SocketAddr>().is_err()
    {
        return Err(ConfigError::ValidationError(format!(
            "observability.metrics_addr is not a socket address: {addr}"
        )));
    }

    Ok(())
}

fn validate_retry(section: &str, retry: &RetryPolicy) -> Result<(), ConfigError> {
    if retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{section}.max_attempts must be at least 1"
        )));
    }
    if retry.multiplier < 1.0 {
        return Err(ConfigError::ValidationError(format!(
            "{section}.multiplier must be at least 1.0"
        )));
    }
    if !(0.0..=1.0).contains(&retry.jitter_factor) {
        return Err(ConfigError::ValidationError(format!(
            "{section}.jitter_factor must be between 0.0 and 1.0"
        )));
    }
    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
