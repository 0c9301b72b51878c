//! Member entity - a user's membership in one guild

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{PresenceStatus, Role, User};
use crate::value_objects::Snowflake;

/// Voice connection state of a member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoiceState {
    /// Voice channel the member is connected to, resolved within the guild
    pub channel_id: Option<Snowflake>,
    pub session_id: Option<String>,
    pub deaf: bool,
    pub mute: bool,
    pub self_deaf: bool,
    pub self_mute: bool,
    pub suppress: bool,
}

/// Guild member
///
/// `roles` holds the guild's own Role values, never ids the guild does not
/// know about. `guild_id` is a non-owning back-reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub user: User,
    pub guild_id: Snowflake,
    pub roles: Vec<Role>,
    pub joined_at: Option<DateTime<Utc>>,
    pub status: PresenceStatus,
    pub game_id: Option<u64>,
    pub voice: VoiceState,
}

impl Member {
    /// Create a new member with no roles and default presence
    pub fn new(user: User, guild_id: Snowflake) -> Self {
        Self {
            user,
            guild_id,
            roles: Vec::new(),
            joined_at: None,
            status: PresenceStatus::default(),
            game_id: None,
            voice: VoiceState::default(),
        }
    }

    /// Member id (same as the user id)
    #[inline]
    pub fn id(&self) -> Snowflake {
        self.user.id
    }

    /// Display name of the member
    #[inline]
    pub fn name(&self) -> &str {
        &self.user.username
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.iter().any(|r| r.id == role_id)
    }

    /// Replace the stored copy of a role after the guild's role changed
    pub fn refresh_role(&mut self, role: &Role) {
        if let Some(slot) = self.roles.iter_mut().find(|r| r.id == role.id) {
            *slot = role.clone();
        }
    }

    /// Drop a role from the member
    pub fn remove_role(&mut self, role_id: Snowflake) {
        self.roles.retain(|r| r.id != role_id);
    }

    /// Check whether the member is connected to a voice channel
    #[inline]
    pub fn in_voice(&self) -> bool {
        self.voice.channel_id.is_some()
    }
}
