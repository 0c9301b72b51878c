//! # chat-common
//!
//! Shared utilities: client configuration and tracing setup.

pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    ClientConfig, ConfigError, Environment, DEFAULT_MAX_MESSAGES, DEFAULT_OUTBOUND_BUFFER,
};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
