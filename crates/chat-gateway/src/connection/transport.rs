//! Frame handling for one socket session
//!
//! [`GatewayTransport`] sits between the socket read loop and the bus. It is
//! synchronous so it can be driven from tests with plain strings.

use std::time::Duration;

use chat_core::{Event, EventKind};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{Heartbeat, Outbound};
use crate::bus::EventBus;
use crate::error::GatewayResult;
use crate::protocol::{describe_close, GatewayMessage, HeartbeatInfo, OpCode};

/// What to do with a decoded frame
#[derive(Debug)]
pub enum FrameAction {
    /// READY: (re)start the heartbeat, then forward the event
    Ready {
        heartbeat: Option<Duration>,
        event: Event,
    },
    /// A recognized dispatch event
    Dispatch(Event),
    /// A dispatch whose name is not recognized
    UnknownEvent(Option<String>),
    /// Any op other than dispatch
    UnhandledOp(u8),
}

impl FrameAction {
    pub fn classify(message: GatewayMessage) -> Self {
        if !message.is_dispatch() {
            return Self::UnhandledOp(message.op);
        }

        let Some(kind) = message.t.as_deref().and_then(EventKind::from_dispatch_name) else {
            return Self::UnknownEvent(message.t);
        };

        let data = message.d.unwrap_or(Value::Null);
        if kind == EventKind::Ready {
            let heartbeat = HeartbeatInfo::deserialize(&data)
                .ok()
                .and_then(HeartbeatInfo::interval)
                .filter(|interval| !interval.is_zero());
            return Self::Ready {
                heartbeat,
                event: Event::from_value(kind, data),
            };
        }

        Self::Dispatch(Event::from_value(kind, data))
    }
}

/// Per-connection frame handler
///
/// Errors returned here only mean the bus has stopped.
#[derive(Debug)]
pub struct GatewayTransport {
    bus: EventBus,
    outbound: Outbound,
    heartbeat: Option<Heartbeat>,
}

impl GatewayTransport {
    pub fn new(bus: EventBus, outbound: Outbound) -> Self {
        Self {
            bus,
            outbound,
            heartbeat: None,
        }
    }

    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    pub fn is_heartbeating(&self) -> bool {
        self.heartbeat.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn opened(&mut self) -> GatewayResult<()> {
        tracing::info!("Gateway socket opened");
        self.bus.dispatch(Event::new(EventKind::SocketOpened, Map::new()))
    }

    /// Handle one text frame
    ///
    /// Frames that are not valid JSON or not an envelope are logged and
    /// dropped.
    pub fn handle_frame(&mut self, raw: &str) -> GatewayResult<()> {
        self.raw_received(Value::String(raw.to_string()), false)?;
        self.handle_text(raw)
    }

    /// Handle one binary frame
    ///
    /// The untouched bytes go out as SOCKET_RAW_RECEIVE before decoding.
    /// Frames that are not UTF-8 stop there.
    pub fn handle_binary(&mut self, raw: &[u8]) -> GatewayResult<()> {
        self.raw_received(Value::from(raw), true)?;

        match std::str::from_utf8(raw) {
            Ok(text) => self.handle_text(text),
            Err(e) => {
                tracing::warn!(error = %e, len = raw.len(), "Dropping binary frame that is not UTF-8");
                Ok(())
            }
        }
    }

    fn raw_received(&self, msg: Value, binary: bool) -> GatewayResult<()> {
        let mut payload = Map::new();
        payload.insert("msg".to_string(), msg);
        payload.insert("binary".to_string(), Value::Bool(binary));
        self.bus.dispatch(Event::new(EventKind::SocketRawReceive, payload))
    }

    fn handle_text(&mut self, raw: &str) -> GatewayResult<()> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, len = raw.len(), "Dropping frame that is not JSON");
                return Ok(());
            }
        };
        self.bus
            .dispatch(local_event(EventKind::SocketResponse, "response", value.clone()))?;

        let message = match GatewayMessage::deserialize(value) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping frame that is not a gateway envelope");
                return Ok(());
            }
        };
        tracing::trace!(frame = %message, "Frame received");

        match FrameAction::classify(message) {
            FrameAction::Ready { heartbeat, event } => {
                match heartbeat {
                    Some(interval) => self.start_heartbeat(interval),
                    None => tracing::warn!("READY carried no usable heartbeat interval"),
                }
                self.bus.dispatch(event)
            }
            FrameAction::Dispatch(event) => self.bus.dispatch(event),
            FrameAction::UnknownEvent(name) => {
                tracing::info!(event = ?name, "Ignoring unknown dispatch event");
                Ok(())
            }
            FrameAction::UnhandledOp(op) => {
                match OpCode::from_u8(op) {
                    Some(code) => tracing::info!(op, name = code.name(), "Unhandled op"),
                    None => tracing::info!(op, "Unknown op"),
                }
                Ok(())
            }
        }
    }

    pub fn closed(&mut self, code: Option<u16>, reason: &str) -> GatewayResult<()> {
        self.stop_heartbeat();
        tracing::info!(
            code = ?code,
            reason,
            meaning = describe_close(code),
            "Gateway socket closed"
        );

        let mut payload = Map::new();
        payload.insert("code".to_string(), json!(code));
        payload.insert("reason".to_string(), json!(reason));
        self.bus.dispatch(Event::new(EventKind::SocketClosed, payload))
    }

    fn start_heartbeat(&mut self, interval: Duration) {
        self.stop_heartbeat();
        self.heartbeat = Some(Heartbeat::start(interval, self.outbound.clone()));
    }

    fn stop_heartbeat(&mut self) {
        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.stop();
        }
    }
}

fn local_event(kind: EventKind, key: &str, value: Value) -> Event {
    let mut payload = Map::new();
    payload.insert(key.to_string(), value);
    Event::new(kind, payload)
}
