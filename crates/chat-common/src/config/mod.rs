//! Configuration structs

mod client_config;

pub use client_config::{
    ClientConfig, ConfigError, Environment, DEFAULT_MAX_MESSAGES, DEFAULT_OUTBOUND_BUFFER,
};
