//! Signal Router configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults. The bind address and channel capacities are externalized so
//! deployments never need a rebuild to retune them.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default HTTP/WebSocket bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default router actor mailbox capacity.
pub const DEFAULT_ROUTER_MAILBOX: usize = 500;

/// Default per-connection outbound buffer capacity.
pub const DEFAULT_CONNECTION_BUFFER: usize = 64;

/// Default instance ID prefix.
pub const DEFAULT_INSTANCE_ID_PREFIX: &str = "sr";

/// Signal Router configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP/WebSocket server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Router actor mailbox capacity (default: 500).
    pub router_mailbox: usize,

    /// Per-connection outbound buffer capacity (default: 64). A full buffer
    /// drops the event; delivery is at-most-once with no backpressure.
    pub connection_buffer: usize,

    /// Unique identifier for this router instance, used in logs.
    pub instance_id: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("SR_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let router_mailbox = parse_capacity(vars, "SR_ROUTER_MAILBOX", DEFAULT_ROUTER_MAILBOX)?;
        let connection_buffer =
            parse_capacity(vars, "SR_CONNECTION_BUFFER", DEFAULT_CONNECTION_BUFFER)?;

        let instance_id = vars.get("SR_INSTANCE_ID").cloned().unwrap_or_else(|| {
            let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
            let uuid_suffix = uuid::Uuid::new_v4().to_string();
            let short_suffix = uuid_suffix.get(..8).unwrap_or("00000000");
            format!("{DEFAULT_INSTANCE_ID_PREFIX}-{hostname}-{short_suffix}")
        });

        Ok(Config {
            bind_address,
            router_mailbox,
            connection_buffer,
            instance_id,
        })
    }
}

/// Parse a positive capacity value, rejecting zero and non-numeric input.
fn parse_capacity(
    vars: &HashMap<String, String>,
    key: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match vars.get(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
            }),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("Config should load");

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.router_mailbox, DEFAULT_ROUTER_MAILBOX);
        assert_eq!(config.connection_buffer, DEFAULT_CONNECTION_BUFFER);
        assert!(config.instance_id.starts_with("sr-"));
    }

    #[test]
    fn test_from_vars_custom_values() {
        let vars = HashMap::from([
            ("SR_BIND_ADDRESS".to_string(), "127.0.0.1:9090".to_string()),
            ("SR_ROUTER_MAILBOX".to_string(), "100".to_string()),
            ("SR_CONNECTION_BUFFER".to_string(), "16".to_string()),
            ("SR_INSTANCE_ID".to_string(), "sr-custom-001".to_string()),
        ]);

        let config = Config::from_vars(&vars).expect("Config should load");

        assert_eq!(config.bind_address, "127.0.0.1:9090");
        assert_eq!(config.router_mailbox, 100);
        assert_eq!(config.connection_buffer, 16);
        assert_eq!(config.instance_id, "sr-custom-001");
    }

    #[test]
    fn test_invalid_mailbox_capacity_rejected() {
        for bad in ["0", "-5", "lots"] {
            let vars = HashMap::from([("SR_ROUTER_MAILBOX".to_string(), bad.to_string())]);
            let result = Config::from_vars(&vars);
            assert!(
                matches!(result, Err(ConfigError::InvalidValue { ref key, .. }) if key == "SR_ROUTER_MAILBOX"),
                "value {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_connection_buffer_rejected() {
        let vars = HashMap::from([("SR_CONNECTION_BUFFER".to_string(), "zero".to_string())]);
        assert!(Config::from_vars(&vars).is_err());
    }
}
