//! Wire shapes of the dispatch payloads the state store consumes
//!
//! These mirror what the gateway sends and are converted into entities by
//! the builder. Everything not needed to identify an object is defaulted so
//! that sparse payloads still decode.

use chat_core::entities::parse_timestamp;
use chat_core::{Channel, ChannelType, ModelError, Permissions, PresenceStatus, Role, Snowflake, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    pub user: User,
    #[serde(default)]
    pub guilds: Vec<GuildPayload>,
    #[serde(default)]
    pub private_channels: Vec<PrivateChannelPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildPayload {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub afk_timeout: Option<u64>,
    #[serde(default)]
    pub afk_channel_id: Option<Snowflake>,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub roles: Vec<RolePayload>,
    #[serde(default)]
    pub members: Vec<MemberPayload>,
    #[serde(default)]
    pub presences: Vec<PresencePayload>,
    #[serde(default)]
    pub channels: Vec<ChannelPayload>,
    #[serde(default)]
    pub voice_states: Vec<VoiceStatePayload>,
}

/// Role fields as sent on create and update
///
/// Absent fields keep their current value on update and take the default
/// on create.
#[derive(Debug, Clone, Deserialize)]
pub struct RolePayload {
    pub id: Snowflake,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub hoist: Option<bool>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
    #[serde(default)]
    pub managed: Option<bool>,
}

impl RolePayload {
    /// Build the role; it is the everyone role iff its id is the guild's id
    pub fn into_role(self, guild_id: Snowflake) -> Role {
        let mut role = Role::new(self.id, String::new(), Permissions::empty());
        role.everyone = self.id == guild_id;
        self.apply_to(&mut role);
        role
    }

    /// Overwrite the fields present in this payload
    pub fn apply_to(self, role: &mut Role) {
        if let Some(name) = self.name {
            role.name = name;
        }
        if let Some(color) = self.color {
            role.color = color;
        }
        if let Some(hoist) = self.hoist {
            role.hoist = hoist;
        }
        if let Some(position) = self.position {
            role.position = position;
        }
        if let Some(permissions) = self.permissions {
            role.permissions = permissions;
        }
        if let Some(managed) = self.managed {
            role.managed = managed;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildRolePayload {
    pub guild_id: Snowflake,
    pub role: RolePayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleDeletePayload {
    pub guild_id: Snowflake,
    pub role_id: Snowflake,
}

/// Member as sent in guild snapshots and member events
#[derive(Debug, Clone, Deserialize)]
pub struct MemberPayload {
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub user: User,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<String>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
}

impl MemberPayload {
    pub fn joined_at(&self) -> Result<Option<DateTime<Utc>>, ModelError> {
        self.joined_at
            .as_deref()
            .map(|raw| parse_timestamp("joined_at", raw))
            .transpose()
    }
}

/// User fragment carried by presence updates
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceUser {
    pub id: Snowflake,
    #[serde(default)]
    pub username: Option<String>,
    /// `Some(None)` means the avatar was explicitly cleared
    #[serde(default, deserialize_with = "nullable")]
    pub avatar: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresencePayload {
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub user: PresenceUser,
    #[serde(default)]
    pub status: PresenceStatus,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub game_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelPayload {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub channel_type: ChannelType,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub recipient: Option<User>,
}

/// Channel fields as sent on update
///
/// Absent fields keep their current value; an explicit null topic clears it.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelUpdatePayload {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub channel_type: Option<ChannelType>,
    #[serde(default, deserialize_with = "nullable")]
    pub topic: Option<Option<String>>,
    #[serde(default)]
    pub position: Option<i32>,
}

impl ChannelUpdatePayload {
    /// Overwrite the fields present in this payload
    pub fn apply_to(self, channel: &mut Channel) {
        if let Some(name) = self.name {
            channel.name = name;
        }
        if let Some(channel_type) = self.channel_type {
            channel.channel_type = channel_type;
        }
        if let Some(topic) = self.topic {
            channel.topic = topic;
        }
        if let Some(position) = self.position {
            channel.position = position;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrivateChannelPayload {
    pub id: Snowflake,
    pub recipient: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceStatePayload {
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub self_deaf: bool,
    #[serde(default)]
    pub self_mute: bool,
    #[serde(default)]
    pub suppress: bool,
}

/// A created message; unmodelled fields are collected in `extras`
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author: User,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub edited_timestamp: Option<String>,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default)]
    pub mentions: Vec<User>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// Payload that names an object by id (message/channel/guild deletes)
#[derive(Debug, Clone, Deserialize)]
pub struct IdPayload {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
}

/// Keep explicit nulls distinguishable from absent fields
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Accept a number, a numeric string, or null
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected unsigned integer, got {n}"))),
        Value::String(s) => s
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected unsigned integer, got {s:?}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected unsigned integer, got {other}"
        ))),
    }
}
