//! Test helpers for integration tests
//!
//! Provides recording and failing listeners, an in-process harness that
//! feeds frames through the transport, and a scripted mock gateway server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use chat_cache::{StateHandle, StateStore};
use chat_core::{Event, EventKind, Listener, ListenerError, ListenerResult};
use chat_gateway::{EventBus, Frame, GatewayTransport, Outbound};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::fixtures::dispatch_frame;

/// How long the mock gateway waits on the client before giving up
const MOCK_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Listeners
// ============================================================================

/// Keeps a copy of every event it is handed, as it looked at that point
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(Event::kind).collect()
    }

    /// Recorded events of one kind, in delivery order
    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn last_of(&self, kind: EventKind) -> Option<Event> {
        self.of_kind(kind).pop()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Listener for RecordingListener {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_event(&mut self, event: &mut Event) -> ListenerResult {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn on_error(&mut self, event: &mut Event) -> ListenerResult {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Fails on every event of the given kind, or on every event
#[derive(Clone, Default)]
pub struct FailingListener {
    only: Option<EventKind>,
    calls: Arc<Mutex<usize>>,
}

impl FailingListener {
    pub fn always() -> Self {
        Self::default()
    }

    pub fn on(kind: EventKind) -> Self {
        Self {
            only: Some(kind),
            calls: Arc::default(),
        }
    }

    /// Number of events (error events included) this listener was handed
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl Listener for FailingListener {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_event(&mut self, event: &mut Event) -> ListenerResult {
        *self.calls.lock() += 1;
        match self.only {
            Some(kind) if kind != event.kind() => Ok(()),
            _ => Err(ListenerError::failed(format!("refusing {}", event.kind()))),
        }
    }

    fn on_error(&mut self, _event: &mut Event) -> ListenerResult {
        *self.calls.lock() += 1;
        Err(ListenerError::failed("refusing error events too"))
    }
}

// ============================================================================
// In-process harness
// ============================================================================

/// Transport, bus and state store wired together without a socket
///
/// Outbound frames (heartbeats) land in `outbound`.
pub struct Harness {
    pub bus: EventBus,
    pub state: StateHandle,
    pub transport: GatewayTransport,
    pub outbound: mpsc::Receiver<Frame>,
    _bus_task: JoinHandle<()>,
}

impl Harness {
    /// Must be called from within a tokio runtime
    pub fn new(max_messages: usize) -> Result<Self> {
        let (bus, bus_task) = EventBus::start();
        let store = StateStore::new(max_messages);
        let state = store.handle();
        bus.add_listener(store)?;

        let (tx, rx) = mpsc::channel(16);
        let transport = GatewayTransport::new(bus.clone(), Outbound::new(bus.clone(), tx));

        Ok(Self {
            bus,
            state,
            transport,
            outbound: rx,
            _bus_task: bus_task,
        })
    }

    pub fn add_listener<L: Listener>(&self, listener: L) -> Result<()> {
        self.bus.add_listener(listener)?;
        Ok(())
    }

    /// Feed a raw text frame
    pub fn frame(&mut self, raw: &str) -> Result<()> {
        self.transport.handle_frame(raw)?;
        Ok(())
    }

    /// Feed an op 0 frame for `name`
    pub fn dispatch(&mut self, name: &str, data: &Value) -> Result<()> {
        self.frame(&dispatch_frame(name, data))
    }

    /// Wait until everything fed so far has been delivered
    pub async fn flush(&self) -> Result<()> {
        self.bus.flush().await?;
        Ok(())
    }
}

// ============================================================================
// Mock gateway server
// ============================================================================

/// One step of the mock gateway's script
#[derive(Debug, Clone)]
pub enum Step {
    /// Send a text frame
    Send(String),
    /// Wait for the client to send a text frame
    Expect,
    /// Send a close frame
    Close(u16, &'static str),
}

/// A gateway server that accepts one connection and plays a script
pub struct MockGateway {
    pub addr: SocketAddr,
    handle: JoinHandle<Result<Vec<String>>>,
}

impl MockGateway {
    pub async fn start(script: Vec<Step>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(serve(listener, script));
        Ok(Self { addr, handle })
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Wait for the script to finish; returns the text frames the client sent
    pub async fn finish(self) -> Result<Vec<String>> {
        self.handle.await?
    }
}

async fn serve(listener: TcpListener, script: Vec<Step>) -> Result<Vec<String>> {
    let (stream, _peer) = listener.accept().await?;
    let mut ws = tokio_tungstenite::accept_async(stream).await?;
    let mut received = Vec::new();

    for step in script {
        match step {
            Step::Send(text) => ws.send(Message::Text(text)).await?,
            Step::Expect => loop {
                match tokio::time::timeout(MOCK_TIMEOUT, ws.next()).await? {
                    Some(Ok(Message::Text(text))) => {
                        received.push(text);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => bail!("client went away while a frame was expected"),
                }
            },
            Step::Close(code, reason) => {
                ws.close(Some(CloseFrame {
                    code: CloseCode::from(code),
                    reason: reason.into(),
                }))
                .await?;
            }
        }
    }

    // Drain until the client finishes the close handshake
    while let Ok(Some(Ok(message))) = tokio::time::timeout(MOCK_TIMEOUT, ws.next()).await {
        if let Message::Text(text) = message {
            received.push(text);
        }
    }
    Ok(received)
}
