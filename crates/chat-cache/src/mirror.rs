//! The in-memory mirror of remote state

use chat_core::{AnyChannel, Guild, Message, PrivateChannel, Snowflake, User};

use crate::ring::MessageRing;

/// Everything the client knows about the remote side
///
/// Guild ids are unique within `guilds`, private channel ids within
/// `private_channels`.
#[derive(Debug, Clone)]
pub struct Mirror {
    pub(crate) user: Option<User>,
    pub(crate) guilds: Vec<Guild>,
    pub(crate) private_channels: Vec<PrivateChannel>,
    pub(crate) messages: MessageRing,
}

impl Mirror {
    pub fn new(max_messages: usize) -> Self {
        Self {
            user: None,
            guilds: Vec::new(),
            private_channels: Vec::new(),
            messages: MessageRing::new(max_messages),
        }
    }

    /// The logged-in user, once READY has been seen
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn guilds(&self) -> &[Guild] {
        &self.guilds
    }

    pub fn private_channels(&self) -> &[PrivateChannel] {
        &self.private_channels
    }

    pub fn messages(&self) -> &MessageRing {
        &self.messages
    }

    pub fn guild(&self, id: Snowflake) -> Option<&Guild> {
        self.guilds.iter().find(|g| g.id == id)
    }

    pub(crate) fn guild_mut(&mut self, id: Snowflake) -> Option<&mut Guild> {
        self.guilds.iter_mut().find(|g| g.id == id)
    }

    pub fn message(&self, id: Snowflake) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn private_channel(&self, id: Snowflake) -> Option<&PrivateChannel> {
        self.private_channels.iter().find(|c| c.id == id)
    }

    /// Look a channel up across all guilds, then among private channels
    ///
    /// The first match wins.
    pub fn channel(&self, id: Snowflake) -> Option<AnyChannel> {
        self.guilds
            .iter()
            .find_map(|g| g.channel(id))
            .cloned()
            .map(AnyChannel::Guild)
            .or_else(|| self.private_channel(id).cloned().map(AnyChannel::Private))
    }

    /// Insert a guild, replacing one with the same id in place
    pub(crate) fn upsert_guild(&mut self, guild: Guild) {
        match self.guild_mut(guild.id) {
            Some(slot) => *slot = guild,
            None => self.guilds.push(guild),
        }
    }

    pub(crate) fn remove_guild(&mut self, id: Snowflake) -> Option<Guild> {
        let index = self.guilds.iter().position(|g| g.id == id)?;
        Some(self.guilds.remove(index))
    }

    /// Insert a private channel, replacing one with the same id in place
    pub(crate) fn upsert_private_channel(&mut self, channel: PrivateChannel) {
        match self.private_channels.iter_mut().find(|c| c.id == channel.id) {
            Some(slot) => *slot = channel,
            None => self.private_channels.push(channel),
        }
    }

    pub(crate) fn remove_private_channel(&mut self, id: Snowflake) -> Option<PrivateChannel> {
        let index = self.private_channels.iter().position(|c| c.id == id)?;
        Some(self.private_channels.remove(index))
    }
}
