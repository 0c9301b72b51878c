//! State store listener
//!
//! [`StateStore`] is registered first on the bus. For every dispatch event
//! it updates the mirror and attaches the entities it resolved to the event,
//! so listeners registered after it can read them without lookups.
//! [`StateHandle`] gives the rest of the application read access.

use std::sync::Arc;

use chat_core::entities::parse_timestamp;
use chat_core::{
    AnyChannel, ChannelRef, Event, Guild, Listener, ListenerResult, Member, Message,
    PrivateChannel, Snowflake, User,
};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::builder::{build_channel, build_guild, build_member, resolve_voice_state};
use crate::mirror::Mirror;
use crate::payloads::{
    ChannelPayload, ChannelUpdatePayload, GuildPayload, GuildRoleDeletePayload, GuildRolePayload, IdPayload,
    MemberPayload, MessagePayload, PresencePayload, ReadyPayload, VoiceStatePayload,
};

type SharedMirror = Arc<RwLock<Mirror>>;

/// Listener that keeps the mirror in sync with the event stream
pub struct StateStore {
    mirror: SharedMirror,
}

impl StateStore {
    pub fn new(max_messages: usize) -> Self {
        Self {
            mirror: Arc::new(RwLock::new(Mirror::new(max_messages))),
        }
    }

    /// A read handle onto this store's mirror
    pub fn handle(&self) -> StateHandle {
        StateHandle {
            mirror: Arc::clone(&self.mirror),
        }
    }
}

impl Listener for StateStore {
    fn name(&self) -> &str {
        "state-store"
    }

    fn on_ready(&mut self, event: &mut Event) -> ListenerResult {
        let payload: ReadyPayload = event.decode()?;
        let guilds = payload
            .guilds
            .into_iter()
            .map(build_guild)
            .collect::<Result<Vec<_>, _>>()?;

        let mut mirror = self.mirror.write();
        mirror.user = Some(payload.user.clone());
        for guild in guilds {
            mirror.upsert_guild(guild);
        }
        for pm in payload.private_channels {
            mirror.upsert_private_channel(PrivateChannel::new(pm.id, pm.recipient));
        }
        debug!(
            user_id = %payload.user.id,
            guilds = mirror.guilds.len(),
            private_channels = mirror.private_channels.len(),
            "Mirror populated from READY"
        );

        event.user = Some(payload.user);
        Ok(())
    }

    fn on_message_create(&mut self, event: &mut Event) -> ListenerResult {
        let payload: MessagePayload = event.decode()?;
        let mut mirror = self.mirror.write();

        let channel = mirror.channel(payload.channel_id);
        let channel_ref = channel.as_ref().map_or(
            ChannelRef::Unresolved {
                channel_id: payload.channel_id,
            },
            AnyChannel::to_ref,
        );

        let mut message = Message::new(payload.id, channel_ref, payload.author, payload.content);
        message.timestamp = payload
            .timestamp
            .as_deref()
            .map(|raw| parse_timestamp("timestamp", raw))
            .transpose()?;
        message.edited_timestamp = payload
            .edited_timestamp
            .as_deref()
            .map(|raw| parse_timestamp("edited_timestamp", raw))
            .transpose()?;
        message.tts = payload.tts;
        message.mention_everyone = payload.mention_everyone;
        message.mentions = payload.mentions;
        message.extras = payload.extras;

        // A replayed create overwrites the stored copy
        if let Some(evicted) = mirror.messages.upsert(message.clone()) {
            trace!(message_id = %evicted.id, "Evicted oldest message");
        }

        event.message = Some(message);
        event.channel = channel;
        Ok(())
    }

    fn on_message_delete(&mut self, event: &mut Event) -> ListenerResult {
        let payload: IdPayload = event.decode()?;
        let mut mirror = self.mirror.write();

        let Some(message) = mirror.messages.remove(payload.id) else {
            return Ok(());
        };
        let channel_id = payload.channel_id.unwrap_or_else(|| message.channel_id());
        event.channel = mirror.channel(channel_id);
        event.message = Some(message);
        Ok(())
    }

    fn on_message_update(&mut self, event: &mut Event) -> ListenerResult {
        let Some(id) = event.get_id("id") else {
            return Ok(());
        };
        let mut mirror = self.mirror.write();

        let Some(index) = mirror.messages.position(id) else {
            return Ok(());
        };
        let Some(old) = mirror.message(id).cloned() else {
            return Ok(());
        };

        let mut new = old.clone();
        for (field, value) in event.payload() {
            new.apply_field(field, value)?;
        }
        mirror.messages.replace(index, new.clone());

        event.channel = mirror.channel(new.channel_id());
        event.old_message = Some(old);
        event.new_message = Some(new);
        Ok(())
    }

    fn on_presence_update(&mut self, event: &mut Event) -> ListenerResult {
        let payload: PresencePayload = event.decode()?;
        let Some(guild_id) = payload.guild_id else {
            return Ok(());
        };
        let mut mirror = self.mirror.write();

        let Some(member) = mirror
            .guild_mut(guild_id)
            .and_then(|g| g.member_mut(payload.user.id))
        else {
            return Ok(());
        };

        member.status = payload.status;
        member.game_id = payload.game_id;
        if let Some(username) = payload.user.username {
            member.user.username = username;
        }
        if let Some(avatar) = payload.user.avatar {
            member.user.avatar = avatar;
        }

        event.member = Some(member.clone());
        Ok(())
    }

    fn on_user_update(&mut self, event: &mut Event) -> ListenerResult {
        let user: User = event.decode()?;
        self.mirror.write().user = Some(user.clone());
        event.user = Some(user);
        Ok(())
    }

    fn on_channel_create(&mut self, event: &mut Event) -> ListenerResult {
        let payload: ChannelPayload = event.decode()?;
        let mut mirror = self.mirror.write();

        if payload.is_private {
            let Some(recipient) = payload.recipient else {
                return Ok(());
            };
            let channel = PrivateChannel::new(payload.id, recipient);
            mirror.upsert_private_channel(channel.clone());
            event.channel = Some(AnyChannel::Private(channel));
            return Ok(());
        }

        let Some(guild) = payload.guild_id.and_then(|id| mirror.guild_mut(id)) else {
            return Ok(());
        };
        let channel = build_channel(payload, guild.id);
        guild.upsert_channel(channel.clone());
        event.channel = Some(AnyChannel::Guild(channel));
        Ok(())
    }

    fn on_channel_update(&mut self, event: &mut Event) -> ListenerResult {
        let payload: ChannelUpdatePayload = event.decode()?;
        let mut mirror = self.mirror.write();

        let Some(channel) = payload
            .guild_id
            .and_then(|id| mirror.guild_mut(id))
            .and_then(|g| g.channel_mut(payload.id))
        else {
            return Ok(());
        };

        payload.apply_to(channel);
        event.channel = Some(AnyChannel::Guild(channel.clone()));
        Ok(())
    }

    fn on_channel_delete(&mut self, event: &mut Event) -> ListenerResult {
        let payload: IdPayload = event.decode()?;
        let mut mirror = self.mirror.write();

        let removed = match payload.guild_id {
            Some(guild_id) => mirror
                .guild_mut(guild_id)
                .and_then(|g| g.remove_channel(payload.id))
                .map(AnyChannel::Guild),
            None => mirror
                .remove_private_channel(payload.id)
                .map(AnyChannel::Private),
        };

        event.channel = removed;
        Ok(())
    }

    fn on_guild_member_add(&mut self, event: &mut Event) -> ListenerResult {
        let payload: MemberPayload = event.decode()?;
        let Some(guild_id) = payload.guild_id else {
            return Ok(());
        };
        let mut mirror = self.mirror.write();
        let Some(guild) = mirror.guild_mut(guild_id) else {
            return Ok(());
        };

        let mut member = build_member(guild, &payload)?;
        member.voice.deaf = false;
        member.voice.mute = false;
        guild.upsert_member(member.clone());

        event.member = Some(member);
        Ok(())
    }

    fn on_guild_member_remove(&mut self, event: &mut Event) -> ListenerResult {
        let payload: MemberPayload = event.decode()?;
        let Some(guild_id) = payload.guild_id else {
            return Ok(());
        };
        let mut mirror = self.mirror.write();

        event.member = mirror
            .guild_mut(guild_id)
            .and_then(|g| g.remove_member(payload.user.id));
        Ok(())
    }

    fn on_guild_member_update(&mut self, event: &mut Event) -> ListenerResult {
        let payload: MemberPayload = event.decode()?;
        let Some(guild_id) = payload.guild_id else {
            return Ok(());
        };
        let mut mirror = self.mirror.write();
        let Some(guild) = mirror.guild_mut(guild_id) else {
            return Ok(());
        };

        let roles = guild.resolve_roles(&payload.roles);
        let Some(member) = guild.member_mut(payload.user.id) else {
            return Ok(());
        };
        member.user.username = payload.user.username;
        member.user.discriminator = payload.user.discriminator;
        member.user.avatar = payload.user.avatar;
        member.roles = roles;

        event.member = Some(member.clone());
        Ok(())
    }

    fn on_guild_create(&mut self, event: &mut Event) -> ListenerResult {
        let payload: GuildPayload = event.decode()?;
        let guild = build_guild(payload)?;
        debug!(guild_id = %guild.id, members = guild.members.len(), "Guild built");

        self.mirror.write().upsert_guild(guild.clone());
        event.guild = Some(guild);
        Ok(())
    }

    fn on_guild_delete(&mut self, event: &mut Event) -> ListenerResult {
        let payload: IdPayload = event.decode()?;
        event.guild = self.mirror.write().remove_guild(payload.id);
        Ok(())
    }

    fn on_guild_role_create(&mut self, event: &mut Event) -> ListenerResult {
        let payload: GuildRolePayload = event.decode()?;
        let mut mirror = self.mirror.write();
        let Some(guild) = mirror.guild_mut(payload.guild_id) else {
            return Ok(());
        };

        // The everyone role shares the guild id, so upserting keeps it unique
        let role = payload.role.into_role(guild.id);
        guild.upsert_role(role.clone());
        guild.propagate_role(role.id);

        event.role = Some(role);
        event.guild = Some(guild.clone());
        Ok(())
    }

    fn on_guild_role_delete(&mut self, event: &mut Event) -> ListenerResult {
        let payload: GuildRoleDeletePayload = event.decode()?;
        let mut mirror = self.mirror.write();
        let Some(guild) = mirror.guild_mut(payload.guild_id) else {
            return Ok(());
        };
        let Some(role) = guild.remove_role(payload.role_id) else {
            return Ok(());
        };

        event.role = Some(role);
        event.guild = Some(guild.clone());
        Ok(())
    }

    fn on_guild_role_update(&mut self, event: &mut Event) -> ListenerResult {
        let payload: GuildRolePayload = event.decode()?;
        let mut mirror = self.mirror.write();
        let Some(guild) = mirror.guild_mut(payload.guild_id) else {
            return Ok(());
        };
        let role_id = payload.role.id;
        let Some(role) = guild.role_mut(role_id) else {
            return Ok(());
        };

        payload.role.apply_to(role);
        let role = role.clone();
        guild.propagate_role(role_id);

        event.role = Some(role);
        event.guild = Some(guild.clone());
        Ok(())
    }

    fn on_voice_state_update(&mut self, event: &mut Event) -> ListenerResult {
        let payload: VoiceStatePayload = event.decode()?;
        let Some(guild_id) = payload.guild_id else {
            return Ok(());
        };
        let mut mirror = self.mirror.write();

        event.member = mirror
            .guild_mut(guild_id)
            .and_then(|g| resolve_voice_state(g, &payload));
        Ok(())
    }
}

/// Cloneable read access to the mirror
///
/// Lookups return copies; use [`StateHandle::read`] to inspect the mirror
/// in place.
#[derive(Clone)]
pub struct StateHandle {
    mirror: SharedMirror,
}

impl StateHandle {
    /// Run a closure against the mirror under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&Mirror) -> R) -> R {
        f(&self.mirror.read())
    }

    /// Guild channel or private channel with this id, guild channels first
    pub fn channel(&self, id: Snowflake) -> Option<AnyChannel> {
        self.mirror.read().channel(id)
    }

    pub fn message(&self, id: Snowflake) -> Option<Message> {
        self.mirror.read().message(id).cloned()
    }

    pub fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.mirror.read().guild(id).cloned()
    }

    pub fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.mirror
            .read()
            .guild(guild_id)
            .and_then(|g| g.member(user_id))
            .cloned()
    }

    pub fn current_user(&self) -> Option<User> {
        self.mirror.read().current_user().cloned()
    }

    pub fn guilds(&self) -> Vec<Guild> {
        self.mirror.read().guilds().to_vec()
    }

    pub fn private_channels(&self) -> Vec<PrivateChannel> {
        self.mirror.read().private_channels().to_vec()
    }

    /// Retained messages, oldest first
    pub fn messages(&self) -> Vec<Message> {
        self.mirror.read().messages().iter().cloned().collect()
    }
}

impl std::fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mirror = self.mirror.read();
        f.debug_struct("StateHandle")
            .field("guilds", &mirror.guilds.len())
            .field("private_channels", &mirror.private_channels.len())
            .field("messages", &mirror.messages.len())
            .finish()
    }
}
