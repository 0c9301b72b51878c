//! Gateway operation codes
//!
//! Op codes identify the kind of frame carried by the envelope. Only
//! dispatch (0) is acted on when received; heartbeat (1) is sent by the
//! client. The rest are known so they can be named in logs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Gateway operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Server dispatches an event to the client
    Dispatch = 0,
    /// Keep-alive sent by the client
    Heartbeat = 1,
    /// Authenticate the session
    Identify = 2,
    /// Update the client's own status
    StatusUpdate = 3,
    /// Join, move or leave a voice channel
    VoiceStateUpdate = 4,
    /// Voice server keep-alive
    VoiceServerPing = 5,
    /// Resume a dropped session
    Resume = 6,
    /// Server asks the client to reconnect
    Reconnect = 7,
    /// Request offline members of a guild
    RequestGuildMembers = 8,
    /// Session is no longer valid
    InvalidSession = 9,
    /// Sent by the server on connect
    Hello = 10,
    /// Server acknowledged a heartbeat
    HeartbeatAck = 11,
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identify,
            3 => Self::StatusUpdate,
            4 => Self::VoiceStateUpdate,
            5 => Self::VoiceServerPing,
            6 => Self::Resume,
            7 => Self::Reconnect,
            8 => Self::RequestGuildMembers,
            9 => Self::InvalidSession,
            10 => Self::Hello,
            11 => Self::HeartbeatAck,
            _ => return None,
        })
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::StatusUpdate => "StatusUpdate",
            Self::VoiceStateUpdate => "VoiceStateUpdate",
            Self::VoiceServerPing => "VoiceServerPing",
            Self::Resume => "Resume",
            Self::Reconnect => "Reconnect",
            Self::RequestGuildMembers => "RequestGuildMembers",
            Self::InvalidSession => "InvalidSession",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid op code: {value}")))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
