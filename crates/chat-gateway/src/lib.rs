//! # chat-gateway
//!
//! Client side of the chat gateway: the WebSocket transport, the event bus
//! that delivers decoded events to listeners, and [`GatewayClient`] which
//! wires both to the state store from `chat-cache`.

pub mod bus;
pub mod client;
pub mod connection;
pub mod error;
pub mod protocol;

pub use bus::EventBus;
pub use client::GatewayClient;
pub use connection::{Frame, FrameAction, GatewayTransport, Heartbeat, Outbound};
pub use error::{GatewayError, GatewayResult};
