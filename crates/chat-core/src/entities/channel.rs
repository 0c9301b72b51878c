//! Channel entities - guild channels, private channels and references to them

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::User;
use crate::value_objects::Snowflake;

/// Channel type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ChannelType {
    /// Guild text channel
    #[default]
    Text = 0,
    /// Direct message with a single recipient
    Private = 1,
    /// Guild voice channel
    Voice = 2,
}

impl From<u64> for ChannelType {
    fn from(value: u64) -> Self {
        match value {
            1 => Self::Private,
            2 => Self::Voice,
            _ => Self::Text, // Default for 0 and unknown values
        }
    }
}

// The gateway has sent both "text"/"voice" and numeric channel types
impl<'de> Deserialize<'de> for ChannelType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64().map(Self::from).unwrap_or_default(),
            Value::String(s) => match s.as_str() {
                "voice" => Self::Voice,
                "private" | "dm" => Self::Private,
                _ => Self::Text,
            },
            _ => Self::Text,
        })
    }
}

/// Guild channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: Snowflake,
    /// Owning guild (non-owning back-reference)
    pub guild_id: Snowflake,
    pub name: String,
    pub channel_type: ChannelType,
    pub topic: Option<String>,
    pub position: i32,
}

impl Channel {
    /// Create a new guild text channel
    #[must_use]
    pub fn new_text(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
            channel_type: ChannelType::Text,
            topic: None,
            position: 0,
        }
    }
}

/// Direct message channel with a single recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivateChannel {
    pub id: Snowflake,
    pub recipient: User,
}

impl PrivateChannel {
    pub fn new(id: Snowflake, recipient: User) -> Self {
        Self { id, recipient }
    }
}

/// Either kind of channel, as returned by channel lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnyChannel {
    Guild(Channel),
    Private(PrivateChannel),
}

impl AnyChannel {
    #[inline]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Guild(c) => c.id,
            Self::Private(c) => c.id,
        }
    }

    /// Owning guild, absent for private channels
    #[inline]
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::Guild(c) => Some(c.guild_id),
            Self::Private(_) => None,
        }
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private(_))
    }

    /// Non-owning reference to this channel
    pub fn to_ref(&self) -> ChannelRef {
        match self {
            Self::Guild(c) => ChannelRef::Guild {
                guild_id: c.guild_id,
                channel_id: c.id,
            },
            Self::Private(c) => ChannelRef::Private { channel_id: c.id },
        }
    }
}

/// Where a message was posted
///
/// `Unresolved` keeps the raw id when the channel was not in the mirror at
/// the time the message arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChannelRef {
    Guild {
        guild_id: Snowflake,
        channel_id: Snowflake,
    },
    Private {
        channel_id: Snowflake,
    },
    Unresolved {
        channel_id: Snowflake,
    },
}

impl ChannelRef {
    #[inline]
    pub fn channel_id(&self) -> Snowflake {
        match *self {
            Self::Guild { channel_id, .. }
            | Self::Private { channel_id }
            | Self::Unresolved { channel_id } => channel_id,
        }
    }

    #[inline]
    pub fn guild_id(&self) -> Option<Snowflake> {
        match *self {
            Self::Guild { guild_id, .. } => Some(guild_id),
            _ => None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved { .. })
    }
}
