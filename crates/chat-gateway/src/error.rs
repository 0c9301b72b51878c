//! Gateway error types

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised by the transport, the bus and the client
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connecting to or reading from the socket failed
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tungstenite::Error>),

    /// The event bus task has stopped
    #[error("Event bus is closed")]
    BusClosed,

    /// The socket writer has stopped
    #[error("Outbound queue is closed")]
    OutboundClosed,

    /// An outbound frame could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] chat_common::ConfigError),

    /// A background task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}

impl From<tungstenite::Error> for GatewayError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
