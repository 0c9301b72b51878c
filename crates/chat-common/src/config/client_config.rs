//! Client configuration
//!
//! Loads configuration from environment variables, reading a `.env` file
//! first when one is present.

use std::env;
use std::str::FromStr;

/// Default number of messages retained in the message ring
pub const DEFAULT_MAX_MESSAGES: usize = 5000;

/// Default capacity of the outbound frame queue
pub const DEFAULT_OUTBOUND_BUFFER: usize = 100;

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub name: String,
    pub env: Environment,
    /// WebSocket URL of the gateway
    pub gateway_url: String,
    /// Capacity of the message ring
    pub max_messages: usize,
    /// Capacity of the outbound frame queue
    pub outbound_buffer: usize,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "chat-gateway".to_string()
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_outbound_buffer() -> usize {
    DEFAULT_OUTBOUND_BUFFER
}

impl ClientConfig {
    /// Build a configuration with defaults for everything but the URL
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            name: default_app_name(),
            env: Environment::default(),
            gateway_url: gateway_url.into(),
            max_messages: default_max_messages(),
            outbound_buffer: default_outbound_buffer(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `GATEWAY_URL` is missing or a value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway_url = lookup("GATEWAY_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingVar("GATEWAY_URL"))?;

        let env = match lookup("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        Ok(Self {
            name: lookup("APP_NAME").unwrap_or_else(default_app_name),
            env,
            gateway_url,
            max_messages: parse_capacity(&lookup, "MAX_MESSAGES")?
                .unwrap_or_else(default_max_messages),
            outbound_buffer: parse_capacity(&lookup, "OUTBOUND_BUFFER")?
                .unwrap_or_else(default_outbound_buffer),
        })
    }
}

/// Parse a positive count; absent variables yield `None`
fn parse_capacity<F>(lookup: &F, key: &'static str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidValue(key, raw)),
        Ok(n) => Ok(Some(n)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
