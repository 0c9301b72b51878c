//! Listener trait and kind-based routing
//!
//! A listener receives every event published on the bus, in order. Each
//! kind has its own handler method defaulting to a no-op, so an
//! implementation only overrides what it cares about.

use thiserror::Error;

use super::{Event, EventKind};
use crate::error::ModelError;

/// Failures raised by a listener while handling an event
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Malformed {kind} payload: {source}")]
    Payload {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{0}")]
    Failed(String),

    #[error("Listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

pub type ListenerResult = Result<(), ListenerError>;

/// Receives events from the bus
///
/// Handlers run one at a time on the bus task and may take `&mut self`.
/// Returning an error (or panicking) does not stop delivery to the
/// listeners registered after this one; the bus reports it as an
/// [`EventKind::Error`] event instead.
#[allow(unused_variables)]
pub trait Listener: Send + 'static {
    /// Name used in logs and error events
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called for every non-error event before the kind-specific handler
    fn on_event(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_error(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_socket_opened(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_socket_closed(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_socket_raw_receive(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_socket_response(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_socket_raw_send(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_ready(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_message_create(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_message_delete(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_message_update(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_presence_update(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_user_update(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_channel_delete(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_channel_update(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_channel_create(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_guild_member_add(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_guild_member_remove(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_guild_member_update(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_guild_create(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_guild_delete(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_guild_role_create(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_guild_role_delete(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_guild_role_update(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }

    fn on_voice_state_update(&mut self, event: &mut Event) -> ListenerResult {
        Ok(())
    }
}

/// Route an event to the handlers matching its kind
///
/// Error events go to `on_error` only. Every other event goes to
/// `on_event` first; if that fails the kind handler is skipped.
pub fn route<L: Listener + ?Sized>(listener: &mut L, event: &mut Event) -> ListenerResult {
    if event.kind() == EventKind::Error {
        return listener.on_error(event);
    }

    listener.on_event(event)?;

    match event.kind() {
        EventKind::Error => Ok(()),
        EventKind::SocketOpened => listener.on_socket_opened(event),
        EventKind::SocketClosed => listener.on_socket_closed(event),
        EventKind::SocketRawReceive => listener.on_socket_raw_receive(event),
        EventKind::SocketResponse => listener.on_socket_response(event),
        EventKind::SocketRawSend => listener.on_socket_raw_send(event),
        EventKind::Ready => listener.on_ready(event),
        EventKind::MessageCreate => listener.on_message_create(event),
        EventKind::MessageDelete => listener.on_message_delete(event),
        EventKind::MessageUpdate => listener.on_message_update(event),
        EventKind::PresenceUpdate => listener.on_presence_update(event),
        EventKind::UserUpdate => listener.on_user_update(event),
        EventKind::ChannelDelete => listener.on_channel_delete(event),
        EventKind::ChannelUpdate => listener.on_channel_update(event),
        EventKind::ChannelCreate => listener.on_channel_create(event),
        EventKind::GuildMemberAdd => listener.on_guild_member_add(event),
        EventKind::GuildMemberRemove => listener.on_guild_member_remove(event),
        EventKind::GuildMemberUpdate => listener.on_guild_member_update(event),
        EventKind::GuildCreate => listener.on_guild_create(event),
        EventKind::GuildDelete => listener.on_guild_delete(event),
        EventKind::GuildRoleCreate => listener.on_guild_role_create(event),
        EventKind::GuildRoleDelete => listener.on_guild_role_delete(event),
        EventKind::GuildRoleUpdate => listener.on_guild_role_update(event),
        EventKind::VoiceStateUpdate => listener.on_voice_state_update(event),
    }
}
