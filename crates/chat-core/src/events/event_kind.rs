//! Event kinds
//!
//! Every event delivered to listeners carries one of these kinds. Dispatch
//! kinds map one-to-one onto the names sent in the `t` field of op 0 frames;
//! the remaining kinds are produced locally by the transport and the bus.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    // Local events
    /// A listener failed while handling another event
    Error,
    /// Socket connected
    SocketOpened,
    /// Socket closed
    SocketClosed,
    /// A frame arrived, before decoding
    SocketRawReceive,
    /// A frame was decoded into JSON
    SocketResponse,
    /// A frame is about to be written
    SocketRawSend,

    // Dispatch events
    /// Initial state snapshot
    Ready,
    MessageCreate,
    MessageDelete,
    MessageUpdate,
    PresenceUpdate,
    UserUpdate,
    ChannelDelete,
    ChannelUpdate,
    ChannelCreate,
    GuildMemberAdd,
    GuildMemberRemove,
    GuildMemberUpdate,
    GuildCreate,
    GuildDelete,
    GuildRoleCreate,
    GuildRoleDelete,
    GuildRoleUpdate,
    VoiceStateUpdate,
}

impl EventKind {
    /// Dispatch kinds, in the order the gateway documents them
    pub const DISPATCH: [EventKind; 18] = [
        Self::Ready,
        Self::MessageCreate,
        Self::MessageDelete,
        Self::MessageUpdate,
        Self::PresenceUpdate,
        Self::UserUpdate,
        Self::ChannelDelete,
        Self::ChannelUpdate,
        Self::ChannelCreate,
        Self::GuildMemberAdd,
        Self::GuildMemberRemove,
        Self::GuildMemberUpdate,
        Self::GuildCreate,
        Self::GuildDelete,
        Self::GuildRoleCreate,
        Self::GuildRoleDelete,
        Self::GuildRoleUpdate,
        Self::VoiceStateUpdate,
    ];

    /// Get the string representation of the event kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::SocketOpened => "SOCKET_OPENED",
            Self::SocketClosed => "SOCKET_CLOSED",
            Self::SocketRawReceive => "SOCKET_RAW_RECEIVE",
            Self::SocketResponse => "SOCKET_RESPONSE",
            Self::SocketRawSend => "SOCKET_RAW_SEND",
            Self::Ready => "READY",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::MessageDelete => "MESSAGE_DELETE",
            Self::MessageUpdate => "MESSAGE_UPDATE",
            Self::PresenceUpdate => "PRESENCE_UPDATE",
            Self::UserUpdate => "USER_UPDATE",
            Self::ChannelDelete => "CHANNEL_DELETE",
            Self::ChannelUpdate => "CHANNEL_UPDATE",
            Self::ChannelCreate => "CHANNEL_CREATE",
            Self::GuildMemberAdd => "GUILD_MEMBER_ADD",
            Self::GuildMemberRemove => "GUILD_MEMBER_REMOVE",
            Self::GuildMemberUpdate => "GUILD_MEMBER_UPDATE",
            Self::GuildCreate => "GUILD_CREATE",
            Self::GuildDelete => "GUILD_DELETE",
            Self::GuildRoleCreate => "GUILD_ROLE_CREATE",
            Self::GuildRoleDelete => "GUILD_ROLE_DELETE",
            Self::GuildRoleUpdate => "GUILD_ROLE_UPDATE",
            Self::VoiceStateUpdate => "VOICE_STATE_UPDATE",
        }
    }

    /// Classify a dispatch event name
    ///
    /// Returns `None` for names outside the recognized set, including the
    /// names of local kinds.
    #[must_use]
    pub fn from_dispatch_name(name: &str) -> Option<Self> {
        Self::DISPATCH.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Check if this kind arrives from the gateway as an op 0 frame
    #[must_use]
    pub fn is_dispatch(self) -> bool {
        Self::DISPATCH.contains(&self)
    }

    /// Check if this kind is a socket lifecycle notification
    #[must_use]
    pub const fn is_socket(self) -> bool {
        matches!(
            self,
            Self::SocketOpened
                | Self::SocketClosed
                | Self::SocketRawReceive
                | Self::SocketResponse
                | Self::SocketRawSend
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
