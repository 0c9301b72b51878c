//! Construction of entities from payloads
//!
//! `build_guild` turns a full guild payload (from READY or GUILD_CREATE)
//! into a [`Guild`] whose internal references are all resolved.

use chat_core::{Channel, Guild, Member, ModelError, Role, Snowflake};
use tracing::debug;

use crate::payloads::{ChannelPayload, GuildPayload, MemberPayload, VoiceStatePayload};

/// Build a guild with roles, members, presences, channels and voice states
///
/// Member role ids the guild does not define are dropped. An owner id that
/// does not name a member is not recorded. A guild without an everyone role
/// gets one so that every built guild has exactly one.
pub fn build_guild(payload: GuildPayload) -> Result<Guild, ModelError> {
    let guild_id = payload.id;
    let mut guild = Guild::new(guild_id, payload.name);
    guild.icon = payload.icon;
    guild.region = payload.region;
    guild.afk_timeout = payload.afk_timeout;
    guild.afk_channel_id = payload.afk_channel_id;
    guild.unavailable = payload.unavailable;

    for role in payload.roles {
        guild.upsert_role(role.into_role(guild_id));
    }
    if guild.everyone_role().is_none() {
        guild.roles.insert(0, Role::everyone(guild_id));
    }

    for member in &payload.members {
        let member = build_member(&guild, member)?;
        guild.upsert_member(member);
    }

    if let Some(owner_id) = payload.owner_id {
        if !guild.set_owner(owner_id) {
            debug!(guild_id = %guild_id, owner_id = %owner_id, "Guild owner is not a member");
        }
    }

    for presence in payload.presences {
        if let Some(member) = guild.member_mut(presence.user.id) {
            member.status = presence.status;
            member.game_id = presence.game_id;
        }
    }

    for channel in payload.channels {
        guild.upsert_channel(build_channel(channel, guild_id));
    }

    for voice in &payload.voice_states {
        resolve_voice_state(&mut guild, voice);
    }

    Ok(guild)
}

/// Build a member of `guild`, resolving its role ids against the guild
pub fn build_member(guild: &Guild, payload: &MemberPayload) -> Result<Member, ModelError> {
    let mut member = Member::new(payload.user.clone(), guild.id);
    member.roles = guild.resolve_roles(&payload.roles);
    member.joined_at = payload.joined_at()?;
    member.voice.deaf = payload.deaf;
    member.voice.mute = payload.mute;
    Ok(member)
}

pub fn build_channel(payload: ChannelPayload, guild_id: Snowflake) -> Channel {
    Channel {
        id: payload.id,
        guild_id,
        name: payload.name,
        channel_type: payload.channel_type,
        topic: payload.topic,
        position: payload.position,
    }
}

/// Apply a voice state to the member it names
///
/// The channel is looked up within the guild only; an unknown channel id
/// leaves the member disconnected. Returns the updated member, or `None`
/// when the user is not a member of the guild.
pub fn resolve_voice_state(guild: &mut Guild, payload: &VoiceStatePayload) -> Option<Member> {
    let channel_id = payload
        .channel_id
        .filter(|id| guild.channel(*id).is_some());

    let member = guild.member_mut(payload.user_id)?;
    member.voice.channel_id = channel_id;
    member.voice.session_id.clone_from(&payload.session_id);
    member.voice.deaf = payload.deaf;
    member.voice.mute = payload.mute;
    member.voice.self_deaf = payload.self_deaf;
    member.voice.self_mute = payload.self_mute;
    member.voice.suppress = payload.suppress;
    Some(member.clone())
}
