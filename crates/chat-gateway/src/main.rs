//! Chat gateway client entry point
//!
//! Run with:
//! ```bash
//! GATEWAY_URL=wss://gateway.example.com cargo run -p chat-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use anyhow::Context;
use chat_common::{try_init_tracing_with_config, ClientConfig, TracingConfig};
use chat_core::{Event, EventKind, Listener, ListenerResult, User};
use chat_gateway::GatewayClient;
use tracing::{debug, error, info, warn};

/// Logs every event after the state store has processed it
struct EventLogger;

impl Listener for EventLogger {
    fn name(&self) -> &str {
        "event-logger"
    }

    fn on_event(&mut self, event: &mut Event) -> ListenerResult {
        match event.kind() {
            EventKind::SocketRawReceive | EventKind::SocketResponse | EventKind::SocketRawSend => {}
            kind if kind.is_socket() => info!(event = %kind, "Socket event"),
            kind => debug!(event = %kind, "Event"),
        }
        Ok(())
    }

    fn on_error(&mut self, event: &mut Event) -> ListenerResult {
        warn!(
            source = ?event.error_source(),
            error = event.error_message().unwrap_or_default(),
            "Listener error"
        );
        Ok(())
    }

    fn on_ready(&mut self, event: &mut Event) -> ListenerResult {
        info!(
            user = ?event.user.as_ref().map(User::tag),
            "Gateway ready"
        );
        Ok(())
    }

    fn on_message_create(&mut self, event: &mut Event) -> ListenerResult {
        if let Some(message) = &event.message {
            info!(
                id = %message.id,
                author = %message.author.username,
                "Message received"
            );
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Gateway client failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("Failed to load configuration")?;

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }
    info!(env = ?config.env, name = %config.name, "Starting chat gateway client");

    let client = GatewayClient::new(config)?;
    client.add_listener(EventLogger)?;

    tokio::select! {
        result = client.run() => result.context("Gateway session failed")?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    let state = client.state();
    info!(
        guilds = state.guilds().len(),
        messages = state.messages().len(),
        "Shutting down"
    );
    client.shutdown().await?;
    Ok(())
}
