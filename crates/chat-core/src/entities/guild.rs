//! Guild entity - a community grouping roles, members and channels

use serde::Serialize;

use super::{Channel, Member, Role};
use crate::value_objects::Snowflake;

/// Guild (server) entity
///
/// The owner is kept as the id of a member that was present in `members`
/// when the guild was built; an owner id that did not resolve is never
/// stored, so [`Guild::owner`] either yields a real member or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub icon: Option<String>,
    pub region: Option<String>,
    pub afk_timeout: Option<u64>,
    pub afk_channel_id: Option<Snowflake>,
    pub unavailable: bool,
    owner_id: Option<Snowflake>,
    pub roles: Vec<Role>,
    pub members: Vec<Member>,
    pub channels: Vec<Channel>,
}

impl Guild {
    /// Create an empty guild
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon: None,
            region: None,
            afk_timeout: None,
            afk_channel_id: None,
            unavailable: false,
            owner_id: None,
            roles: Vec::new(),
            members: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// Resolve and record the owner; returns false if no such member exists
    pub fn set_owner(&mut self, user_id: Snowflake) -> bool {
        if self.member(user_id).is_some() {
            self.owner_id = Some(user_id);
            true
        } else {
            false
        }
    }

    /// The member that owns this guild
    pub fn owner(&self) -> Option<&Member> {
        self.owner_id.and_then(|id| self.member(id))
    }

    /// The implicit role every member holds
    pub fn everyone_role(&self) -> Option<&Role> {
        self.roles.iter().find(|r| r.everyone)
    }

    pub fn role(&self, role_id: Snowflake) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == role_id)
    }

    pub fn role_mut(&mut self, role_id: Snowflake) -> Option<&mut Role> {
        self.roles.iter_mut().find(|r| r.id == role_id)
    }

    pub fn member(&self, user_id: Snowflake) -> Option<&Member> {
        self.members.iter().find(|m| m.id() == user_id)
    }

    pub fn member_mut(&mut self, user_id: Snowflake) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id() == user_id)
    }

    pub fn channel(&self, channel_id: Snowflake) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    pub fn channel_mut(&mut self, channel_id: Snowflake) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.id == channel_id)
    }

    /// Resolve role ids against this guild's roles
    ///
    /// The result follows the guild's role order; ids the guild does not know
    /// are dropped.
    pub fn resolve_roles(&self, role_ids: &[Snowflake]) -> Vec<Role> {
        self.roles
            .iter()
            .filter(|r| role_ids.contains(&r.id))
            .cloned()
            .collect()
    }

    /// Insert a role, replacing any role with the same id
    pub fn upsert_role(&mut self, role: Role) {
        match self.role_mut(role.id) {
            Some(slot) => *slot = role,
            None => self.roles.push(role),
        }
    }

    /// Insert a member, replacing any member with the same id
    pub fn upsert_member(&mut self, member: Member) {
        match self.member_mut(member.id()) {
            Some(slot) => *slot = member,
            None => self.members.push(member),
        }
    }

    /// Insert a channel, replacing any channel with the same id
    pub fn upsert_channel(&mut self, channel: Channel) {
        match self.channel_mut(channel.id) {
            Some(slot) => *slot = channel,
            None => self.channels.push(channel),
        }
    }

    /// Remove a role from the guild and from every member holding it
    pub fn remove_role(&mut self, role_id: Snowflake) -> Option<Role> {
        let pos = self.roles.iter().position(|r| r.id == role_id)?;
        for member in &mut self.members {
            member.remove_role(role_id);
        }
        Some(self.roles.remove(pos))
    }

    /// Remove a member; the owner reference is cleared if it pointed at them
    pub fn remove_member(&mut self, user_id: Snowflake) -> Option<Member> {
        let pos = self.members.iter().position(|m| m.id() == user_id)?;
        if self.owner_id == Some(user_id) {
            self.owner_id = None;
        }
        Some(self.members.remove(pos))
    }

    /// Remove a channel; members connected to it lose their voice channel
    pub fn remove_channel(&mut self, channel_id: Snowflake) -> Option<Channel> {
        let pos = self.channels.iter().position(|c| c.id == channel_id)?;
        for member in &mut self.members {
            if member.voice.channel_id == Some(channel_id) {
                member.voice.channel_id = None;
            }
        }
        Some(self.channels.remove(pos))
    }

    /// Push a changed role into every member's copy of it
    pub fn propagate_role(&mut self, role_id: Snowflake) {
        if let Some(role) = self.role(role_id).cloned() {
            for member in &mut self.members {
                member.refresh_role(&role);
            }
        }
    }
}
