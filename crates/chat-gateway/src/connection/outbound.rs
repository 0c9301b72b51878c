//! Outbound frame path
//!
//! Every frame written to the socket goes through [`Outbound`], which
//! reports it on the bus as `SOCKET_RAW_SEND` before queueing it for the
//! writer task.

use chat_core::{Event, EventKind};
use serde_json::{json, Map};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::bus::EventBus;
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::GatewayMessage;

/// A frame waiting for the writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    pub fn into_message(self) -> Message {
        match self {
            Self::Text(text) => Message::Text(text),
            Self::Binary(data) => Message::Binary(data),
        }
    }
}

/// Sending half shared by the transport and the heartbeat task
#[derive(Debug, Clone)]
pub struct Outbound {
    bus: EventBus,
    tx: mpsc::Sender<Frame>,
}

impl Outbound {
    pub fn new(bus: EventBus, tx: mpsc::Sender<Frame>) -> Self {
        Self { bus, tx }
    }

    pub async fn send_message(&self, message: &GatewayMessage) -> GatewayResult<()> {
        let json = message.to_json()?;
        self.send_text(json).await
    }

    pub async fn send_text(&self, text: impl Into<String>) -> GatewayResult<()> {
        self.send(Frame::Text(text.into())).await
    }

    pub async fn send_binary(&self, data: Vec<u8>) -> GatewayResult<()> {
        self.send(Frame::Binary(data)).await
    }

    async fn send(&self, frame: Frame) -> GatewayResult<()> {
        let payload = match &frame {
            Frame::Text(text) => json!(text),
            Frame::Binary(data) => json!(data),
        };
        let mut map = Map::new();
        map.insert("payload".to_string(), payload);
        map.insert("binary".to_string(), json!(frame.is_binary()));
        self.bus.dispatch(Event::new(EventKind::SocketRawSend, map))?;

        self.tx
            .send(frame)
            .await
            .map_err(|_| GatewayError::OutboundClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
