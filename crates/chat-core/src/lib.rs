//! # chat-core
//!
//! Model layer for the gateway client: the entities mirrored from the
//! gateway, their value objects, the event type passed through the bus, and
//! the listener trait. This crate does no I/O.

pub mod entities;
pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AnyChannel, Channel, ChannelRef, ChannelType, Guild, Member, Message, PresenceStatus,
    PrivateChannel, Role, User, VoiceState,
};
pub use error::ModelError;
pub use events::{Event, EventKind, Listener, ListenerError, ListenerResult};
pub use value_objects::{Permissions, Snowflake, SnowflakeParseError};
