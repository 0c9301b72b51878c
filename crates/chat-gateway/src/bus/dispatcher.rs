//! Event dispatcher
//!
//! [`EventBus`] is a cloneable handle onto a queue drained by a single actor
//! task. The actor owns the listener list, so no two events are ever handled
//! at the same time and arrival order is kept across all producers.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use chat_core::events::route;
use chat_core::{Event, EventKind, Listener, ListenerError, ListenerResult};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{GatewayError, GatewayResult};

enum Command {
    AddListener(Box<dyn Listener>),
    Dispatch(Event),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Handle onto the event bus
///
/// Dispatching never blocks. Dropping every handle stops the actor once the
/// queue is drained.
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<Command>,
}

impl EventBus {
    /// Spawn the bus actor
    ///
    /// Must be called from within a tokio runtime.
    pub fn start() -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = Dispatcher {
            listeners: Vec::new(),
        };
        let task = tokio::spawn(actor.run(rx));
        tracing::debug!("Event bus started");
        (Self { tx }, task)
    }

    /// Append a listener; it sees every event dispatched after this call
    pub fn add_listener<L: Listener>(&self, listener: L) -> GatewayResult<()> {
        self.send(Command::AddListener(Box::new(listener)))
    }

    /// Queue an event for delivery
    pub fn dispatch(&self, event: Event) -> GatewayResult<()> {
        self.send(Command::Dispatch(event))
    }

    /// Wait until every event queued before this call has been delivered
    pub async fn flush(&self) -> GatewayResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(Command::Flush(done_tx))?;
        done_rx.await.map_err(|_| GatewayError::BusClosed)
    }

    /// Stop the actor after the events already queued
    pub fn shutdown(&self) {
        let _ = self.send(Command::Shutdown);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: Command) -> GatewayResult<()> {
        self.tx.send(command).map_err(|_| GatewayError::BusClosed)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct Dispatcher {
    listeners: Vec<Box<dyn Listener>>,
}

impl Dispatcher {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::AddListener(listener) => {
                    tracing::debug!(
                        listener = listener.name(),
                        position = self.listeners.len(),
                        "Listener registered"
                    );
                    self.listeners.push(listener);
                }
                Command::Dispatch(event) => self.deliver(event),
                Command::Flush(done) => {
                    let _ = done.send(());
                }
                Command::Shutdown => break,
            }
        }

        tracing::debug!("Event bus stopped");
    }

    /// Run one sweep per event, then one per error event it produced
    ///
    /// Failures while handling an error event are only logged, so each
    /// failure is reported exactly once.
    fn deliver(&mut self, event: Event) {
        let mut pending = VecDeque::from([event]);

        while let Some(mut event) = pending.pop_front() {
            let kind = event.kind();
            tracing::trace!(event = %kind, "Dispatching event");

            for listener in &mut self.listeners {
                let Err(err) = invoke(listener.as_mut(), &mut event) else {
                    continue;
                };

                if kind == EventKind::Error {
                    tracing::error!(
                        listener = listener.name(),
                        error = %err,
                        "Listener failed while handling an error event"
                    );
                    continue;
                }

                tracing::warn!(
                    listener = listener.name(),
                    event = %kind,
                    error = %err,
                    "Listener failed"
                );
                pending.push_back(Event::error(&event, listener.name(), &err));
            }
        }
    }
}

/// Call a listener, turning a panic into an error
fn invoke(listener: &mut dyn Listener, event: &mut Event) -> ListenerResult {
    panic::catch_unwind(AssertUnwindSafe(|| route(listener, event)))
        .unwrap_or_else(|payload| Err(ListenerError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
