//! Gateway client
//!
//! Wires the bus, the state store and the transport together and drives a
//! single socket session.

use chat_cache::{StateHandle, StateStore};
use chat_common::ClientConfig;
use chat_core::Listener;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::connection::{Frame, GatewayTransport, Outbound};
use crate::error::{GatewayError, GatewayResult};

/// A gateway client
///
/// The state store is always the first listener, so every listener added
/// through [`GatewayClient::add_listener`] sees events with their entities
/// already resolved.
#[derive(Debug)]
pub struct GatewayClient {
    config: ClientConfig,
    bus: EventBus,
    bus_task: JoinHandle<()>,
    state: StateHandle,
}

impl GatewayClient {
    /// Start the bus and register the state store
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: ClientConfig) -> GatewayResult<Self> {
        let (bus, bus_task) = EventBus::start();
        let store = StateStore::new(config.max_messages);
        let state = store.handle();
        bus.add_listener(store)?;

        Ok(Self {
            config,
            bus,
            bus_task,
            state,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Read access to the mirrored state
    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    pub fn add_listener<L: Listener>(&self, listener: L) -> GatewayResult<()> {
        self.bus.add_listener(listener)
    }

    /// Connect and process frames until the socket closes
    ///
    /// A read error ends the session like an abnormal close. Only a failed
    /// connect or a stopped bus is reported as an error.
    pub async fn run(&self) -> GatewayResult<()> {
        info!(url = %self.config.gateway_url, "Connecting to gateway");
        let (socket, _response) = connect_async(self.config.gateway_url.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        // A zero-capacity channel panics
        let (tx, mut rx) = mpsc::channel::<Frame>(self.config.outbound_buffer.max(1));
        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = sink.send(frame.into_message()).await {
                    warn!(error = %e, "Socket write failed");
                    break;
                }
            }
            if let Err(e) = sink.close().await {
                debug!(error = %e, "Socket close failed");
            }
        });

        let mut transport = GatewayTransport::new(self.bus.clone(), Outbound::new(self.bus.clone(), tx));
        transport.opened()?;

        let mut close_code = None;
        let mut close_reason = String::new();
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => transport.handle_frame(&text)?,
                Ok(Message::Binary(data)) => transport.handle_binary(&data)?,
                Ok(Message::Close(frame)) => {
                    if let Some(frame) = frame {
                        close_code = Some(u16::from(frame.code));
                        close_reason = frame.reason.into_owned();
                    }
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => {
                    warn!(error = %e, "Socket read failed");
                    break;
                }
            }
        }

        transport.closed(close_code, &close_reason)?;
        // Dropping the transport releases the last sender once the heartbeat
        // task has exited, which ends the writer.
        drop(transport);
        writer
            .await
            .map_err(|e| GatewayError::Task(e.to_string()))?;

        info!("Gateway session ended");
        Ok(())
    }

    /// Stop the bus after the events already queued and wait for it
    pub async fn shutdown(self) -> GatewayResult<()> {
        self.bus.shutdown();
        self.bus_task
            .await
            .map_err(|e| GatewayError::Task(e.to_string()))
    }
}
