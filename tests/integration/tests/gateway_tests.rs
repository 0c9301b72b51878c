//! Gateway Integration Tests
//!
//! Frames are fed through the transport into the bus, where the state store
//! runs first and the test listeners after it. The socket tests at the end
//! run against an in-process mock gateway.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use chat_common::ClientConfig;
use chat_core::{
    AnyChannel, ChannelType, Event, EventKind, Listener, ListenerResult, PresenceStatus,
    Snowflake,
};
use chat_gateway::GatewayClient;
use integration_tests::{
    fixtures::*, FailingListener, Harness, MockGateway, RecordingListener, Step,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

fn id(raw: u64) -> Snowflake {
    Snowflake::new(raw)
}

/// Harness with a recorder registered after the store and READY applied
async fn ready_harness(max_messages: usize) -> (Harness, RecordingListener) {
    let mut harness = Harness::new(max_messages).unwrap();
    let recorder = RecordingListener::new();
    harness.add_listener(recorder.clone()).unwrap();
    harness
        .dispatch("READY", &ready_payload(41_250))
        .unwrap();
    harness.flush().await.unwrap();
    (harness, recorder)
}

// ============================================================================
// Snapshot
// ============================================================================

#[tokio::test]
async fn test_ready_snapshot() {
    let (harness, recorder) = ready_harness(100).await;
    let state = &harness.state;

    assert_eq!(state.current_user().unwrap().id, id(42));

    let guild = state.guild(id(10)).unwrap();
    let owner = guild.owner().unwrap();
    assert_eq!(owner.id(), id(42));
    assert_eq!(owner.guild_id, id(10));
    assert_eq!(owner.status, PresenceStatus::Online);
    assert_eq!(owner.roles.len(), 1);
    assert_eq!(owner.roles[0].id, id(1));
    assert_eq!(owner.roles[0].name, "Moderator");
    assert!(guild.members.iter().all(|m| m.guild_id == guild.id));

    assert!(matches!(state.channel(id(100)), Some(AnyChannel::Guild(c)) if c.name == "general"));
    let Some(AnyChannel::Private(dm)) = state.channel(id(200)) else {
        panic!("channel 200 should be private");
    };
    assert_eq!(dm.recipient.username, "friend");

    // The store attached the user before the recorder saw the event
    let ready = recorder.last_of(EventKind::Ready).unwrap();
    assert_eq!(ready.user.unwrap().username, "owner");
    assert!(harness.transport.is_heartbeating());
    assert!(recorder.of_kind(EventKind::Error).is_empty());
}

#[tokio::test]
async fn test_exactly_one_everyone_role() {
    let (mut harness, recorder) = ready_harness(100).await;

    // Snapshot carried it
    let guild = harness.state.guild(id(10)).unwrap();
    assert_eq!(guild.roles.iter().filter(|r| r.everyone).count(), 1);

    // Guild created without one
    harness
        .dispatch(
            "GUILD_CREATE",
            &json!({"id": "20", "name": "Bare", "roles": [role(2, "r", 0)]}),
        )
        .unwrap();
    // A role create reusing the guild id must not add a second
    harness
        .dispatch(
            "GUILD_ROLE_CREATE",
            &json!({"guild_id": "20", "role": role(20, "@everyone", 0x400)}),
        )
        .unwrap();
    harness.flush().await.unwrap();

    let guild = harness.state.guild(id(20)).unwrap();
    let everyone: Vec<_> = guild.roles.iter().filter(|r| r.everyone).collect();
    assert_eq!(everyone.len(), 1);
    assert_eq!(everyone[0].id, guild.id);
    assert_eq!(everyone[0].name, "@everyone");
    assert_eq!(guild.roles.len(), 2);
    assert!(recorder.of_kind(EventKind::Error).is_empty());
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_message_ring_evicts_oldest() {
    let (mut harness, recorder) = ready_harness(3).await;

    for n in 1..=4 {
        harness
            .dispatch("MESSAGE_CREATE", &message(n, 100, &format!("m{n}")))
            .unwrap();
    }
    harness.flush().await.unwrap();

    let ids: Vec<_> = harness.state.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![id(2), id(3), id(4)]);
    assert!(harness.state.message(id(1)).is_none());

    let created = recorder.last_of(EventKind::MessageCreate).unwrap();
    assert_eq!(created.message.unwrap().content, "m4");
    assert!(matches!(created.channel, Some(AnyChannel::Guild(c)) if c.id == id(100)));
}

#[tokio::test]
async fn test_message_in_unknown_channel_is_kept_unresolved() {
    let (mut harness, recorder) = ready_harness(10).await;

    harness
        .dispatch("MESSAGE_CREATE", &message(1, 999, "lost"))
        .unwrap();
    harness.flush().await.unwrap();

    let stored = harness.state.message(id(1)).unwrap();
    assert_eq!(stored.channel_id(), id(999));
    assert!(!stored.channel.is_resolved());
    assert!(recorder.last_of(EventKind::MessageCreate).unwrap().channel.is_none());
}

#[tokio::test]
async fn test_message_update_writes_back() {
    let (mut harness, recorder) = ready_harness(10).await;

    harness.dispatch("MESSAGE_CREATE", &message(500, 100, "a")).unwrap();
    harness.dispatch("MESSAGE_CREATE", &message(501, 100, "b")).unwrap();
    harness
        .dispatch(
            "MESSAGE_UPDATE",
            &json!({
                "id": "500",
                "channel_id": "100",
                "content": "a2",
                "edited_timestamp": "2015-10-01T12:05:00.000000+00:00"
            }),
        )
        .unwrap();
    harness.flush().await.unwrap();

    let update = recorder.last_of(EventKind::MessageUpdate).unwrap();
    assert_eq!(update.old_message.unwrap().content, "a");
    let new = update.new_message.unwrap();
    assert_eq!(new.content, "a2");
    assert!(new.edited_timestamp.is_some());

    let stored = harness.state.message(id(500)).unwrap();
    assert_eq!(stored.content, "a2");
    assert_eq!(stored.author.id, id(42));
    let ids: Vec<_> = harness.state.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![id(500), id(501)]);
}

#[tokio::test]
async fn test_message_delete() {
    let (mut harness, recorder) = ready_harness(10).await;

    harness.dispatch("MESSAGE_CREATE", &message(1, 200, "dm")).unwrap();
    harness
        .dispatch("MESSAGE_DELETE", &json!({"id": "1", "channel_id": "200"}))
        .unwrap();
    harness.flush().await.unwrap();

    assert!(harness.state.messages().is_empty());
    let deleted = recorder.last_of(EventKind::MessageDelete).unwrap();
    assert_eq!(deleted.message.unwrap().content, "dm");
    assert!(matches!(deleted.channel, Some(AnyChannel::Private(_))));
}

// ============================================================================
// Net effect of a sequence
// ============================================================================

#[tokio::test]
async fn test_guild_lifecycle_net_effect() {
    let (mut harness, recorder) = ready_harness(10).await;

    harness
        .dispatch("GUILD_CREATE", &json!({"id": "20", "name": "Second"}))
        .unwrap();
    harness
        .dispatch(
            "CHANNEL_CREATE",
            &json!({"id": "300", "guild_id": "20", "name": "chat", "type": "text"}),
        )
        .unwrap();
    harness
        .dispatch(
            "CHANNEL_UPDATE",
            &json!({"id": "300", "guild_id": "20", "name": "lobby", "type": "voice", "position": 4}),
        )
        .unwrap();
    harness
        .dispatch(
            "GUILD_ROLE_CREATE",
            &json!({"guild_id": "20", "role": role(2, "Helper", 0)}),
        )
        .unwrap();

    let mut joining = member(5, "newcomer", &[2, 77]);
    joining["guild_id"] = json!("20");
    joining["deaf"] = json!(true);
    harness.dispatch("GUILD_MEMBER_ADD", &joining).unwrap();
    harness.flush().await.unwrap();

    let added = harness.state.member(id(20), id(5)).unwrap();
    assert_eq!(added.roles.len(), 1);
    assert!(!added.voice.deaf);

    harness
        .dispatch(
            "GUILD_MEMBER_UPDATE",
            &json!({"guild_id": "20", "user": user(5, "renamed"), "roles": []}),
        )
        .unwrap();
    harness
        .dispatch(
            "PRESENCE_UPDATE",
            &json!({"guild_id": "20", "user": {"id": "5"}, "status": "dnd", "game_id": 9}),
        )
        .unwrap();
    harness
        .dispatch(
            "VOICE_STATE_UPDATE",
            &json!({"guild_id": "20", "user_id": "5", "channel_id": "300", "session_id": "v", "self_deaf": true}),
        )
        .unwrap();
    harness
        .dispatch(
            "GUILD_ROLE_UPDATE",
            &json!({"guild_id": "20", "role": {"id": "2", "name": "Helpers", "color": 255}}),
        )
        .unwrap();
    harness.flush().await.unwrap();

    let guild = harness.state.guild(id(20)).unwrap();
    let channel = guild.channel(id(300)).unwrap();
    assert_eq!(channel.name, "lobby");
    assert_eq!(channel.channel_type, ChannelType::Voice);
    assert_eq!(guild.role(id(2)).unwrap().name, "Helpers");
    assert_eq!(guild.role(id(2)).unwrap().color, 255);

    let member = guild.member(id(5)).unwrap();
    assert_eq!(member.user.username, "renamed");
    assert!(member.roles.is_empty());
    assert_eq!(member.status, PresenceStatus::Dnd);
    assert_eq!(member.game_id, Some(9));
    assert_eq!(member.voice.channel_id, Some(id(300)));
    assert!(member.voice.self_deaf);

    let role_update = recorder.last_of(EventKind::GuildRoleUpdate).unwrap();
    assert_eq!(role_update.guild.unwrap().id, id(20));
    assert_eq!(role_update.role.unwrap().name, "Helpers");

    harness
        .dispatch("GUILD_MEMBER_REMOVE", &json!({"guild_id": "20", "user": {"id": "5"}}))
        .unwrap();
    harness
        .dispatch("CHANNEL_DELETE", &json!({"id": "300", "guild_id": "20"}))
        .unwrap();
    harness
        .dispatch("GUILD_ROLE_DELETE", &json!({"guild_id": "20", "role_id": "2"}))
        .unwrap();
    harness.flush().await.unwrap();

    let guild = harness.state.guild(id(20)).unwrap();
    assert!(guild.member(id(5)).is_none());
    assert!(guild.channels.is_empty());
    assert!(guild.role(id(2)).is_none());
    assert_eq!(
        recorder.last_of(EventKind::GuildMemberRemove).unwrap().member.unwrap().user.username,
        "renamed"
    );

    harness.dispatch("GUILD_DELETE", &json!({"id": "20"})).unwrap();
    harness.flush().await.unwrap();

    assert!(harness.state.guild(id(20)).is_none());
    assert_eq!(harness.state.guilds().len(), 1);
    let deleted = recorder.last_of(EventKind::GuildDelete).unwrap();
    assert_eq!(deleted.guild.unwrap().name, "Second");
    assert!(recorder.of_kind(EventKind::Error).is_empty());
}

#[tokio::test]
async fn test_private_channel_create_and_delete() {
    let (mut harness, recorder) = ready_harness(10).await;

    harness
        .dispatch(
            "CHANNEL_CREATE",
            &json!({"id": "201", "is_private": true, "recipient": user(8, "pal")}),
        )
        .unwrap();
    harness.flush().await.unwrap();
    assert_eq!(harness.state.private_channels().len(), 2);
    assert!(matches!(
        recorder.last_of(EventKind::ChannelCreate).unwrap().channel,
        Some(AnyChannel::Private(c)) if c.recipient.id == id(8)
    ));

    harness.dispatch("CHANNEL_DELETE", &json!({"id": "201"})).unwrap();
    harness.flush().await.unwrap();
    assert_eq!(harness.state.private_channels().len(), 1);
    assert!(harness.state.channel(id(201)).is_none());
}

#[tokio::test]
async fn test_missing_references_are_noops() {
    let (mut harness, recorder) = ready_harness(10).await;
    let before = harness.state.guild(id(10)).unwrap();

    for (name, data) in [
        ("MESSAGE_DELETE", json!({"id": "999", "channel_id": "100"})),
        ("MESSAGE_UPDATE", json!({"id": "999", "content": "x"})),
        ("CHANNEL_DELETE", json!({"id": "999", "guild_id": "10"})),
        ("CHANNEL_DELETE", json!({"id": "999"})),
        ("CHANNEL_UPDATE", json!({"id": "999", "guild_id": "10", "name": "x"})),
        ("GUILD_DELETE", json!({"id": "999"})),
        ("GUILD_ROLE_DELETE", json!({"guild_id": "10", "role_id": "999"})),
        ("GUILD_ROLE_DELETE", json!({"guild_id": "999", "role_id": "1"})),
        ("GUILD_ROLE_UPDATE", json!({"guild_id": "10", "role": {"id": "999"}})),
        ("GUILD_MEMBER_REMOVE", json!({"guild_id": "10", "user": {"id": "999"}})),
        ("GUILD_MEMBER_UPDATE", json!({"guild_id": "10", "user": {"id": "999"}, "roles": []})),
        ("GUILD_MEMBER_ADD", json!({"guild_id": "999", "user": {"id": "5"}, "roles": []})),
        ("PRESENCE_UPDATE", json!({"guild_id": "10", "user": {"id": "999"}, "status": "idle"})),
        ("VOICE_STATE_UPDATE", json!({"guild_id": "10", "user_id": "999", "channel_id": "101"})),
    ] {
        harness.dispatch(name, &data).unwrap();
    }
    harness.flush().await.unwrap();

    assert!(recorder.of_kind(EventKind::Error).is_empty());
    let after = harness.state.guild(id(10)).unwrap();
    assert_eq!(after.roles.len(), before.roles.len());
    assert_eq!(after.members.len(), before.members.len());
    assert_eq!(after.channels.len(), before.channels.len());
    assert_eq!(harness.state.guilds().len(), 1);
    assert_eq!(harness.state.private_channels().len(), 1);

    let delete = recorder.last_of(EventKind::GuildDelete).unwrap();
    assert!(delete.guild.is_none());
}

// ============================================================================
// Listener contract
// ============================================================================

#[tokio::test]
async fn test_failing_listener_is_isolated() {
    let mut harness = Harness::new(10).unwrap();
    let before = RecordingListener::new();
    let failing = FailingListener::on(EventKind::MessageCreate);
    let after = RecordingListener::new();
    harness.add_listener(before.clone()).unwrap();
    harness.add_listener(failing.clone()).unwrap();
    harness.add_listener(after.clone()).unwrap();

    harness.dispatch("READY", &ready_payload(41_250)).unwrap();
    harness.dispatch("MESSAGE_CREATE", &message(1, 100, "one")).unwrap();
    harness.dispatch("MESSAGE_CREATE", &message(2, 100, "two")).unwrap();
    harness.dispatch("GUILD_DELETE", &json!({"id": "10"})).unwrap();
    harness.flush().await.unwrap();

    // The store and both recorders kept working
    assert_eq!(harness.state.messages().len(), 2);
    assert!(harness.state.guilds().is_empty());
    for recorder in [&before, &after] {
        assert_eq!(recorder.of_kind(EventKind::MessageCreate).len(), 2);
        assert_eq!(recorder.of_kind(EventKind::GuildDelete).len(), 1);

        let errors = recorder.of_kind(EventKind::Error);
        assert_eq!(errors.len(), 2);
        for error in &errors {
            assert_eq!(error.error_source(), Some(EventKind::MessageCreate));
            assert_eq!(error.extras["listener"], json!("failing"));
            assert!(error.error_message().unwrap().contains("refusing"));
            assert!(error.get("content").is_some());
        }
    }

    // The error event is delivered right after the sweep that failed
    let kinds = after.kinds();
    let first_create = kinds.iter().position(|k| *k == EventKind::MessageCreate).unwrap();
    assert_eq!(kinds[first_create + 1], EventKind::Error);
}

#[tokio::test]
async fn test_always_failing_listener_reports_once_per_failure() {
    let mut harness = Harness::new(10).unwrap();
    let failing = FailingListener::always();
    let recorder = RecordingListener::new();
    harness.add_listener(failing.clone()).unwrap();
    harness.add_listener(recorder.clone()).unwrap();

    harness.dispatch("USER_UPDATE", &user(42, "me")).unwrap();
    harness.dispatch("GUILD_DELETE", &json!({"id": "1"})).unwrap();
    harness.flush().await.unwrap();

    let kinds = recorder.kinds();
    let failures = kinds.iter().filter(|k| **k != EventKind::Error).count();
    let errors = recorder.of_kind(EventKind::Error);
    assert_eq!(errors.len(), failures);
    assert!(errors.iter().all(|e| e.error_source() != Some(EventKind::Error)));
    // Every event plus every error event reached the failing listener once
    assert_eq!(failing.calls(), kinds.len());
    assert_eq!(harness.state.current_user().unwrap().username, "me");
}

#[tokio::test]
async fn test_malformed_payload_becomes_error_event() {
    let mut harness = Harness::new(10).unwrap();
    let recorder = RecordingListener::new();
    harness.add_listener(recorder.clone()).unwrap();

    harness
        .dispatch("MESSAGE_CREATE", &json!({"id": "1", "content": "no author"}))
        .unwrap();
    harness.flush().await.unwrap();

    let created = recorder.last_of(EventKind::MessageCreate).unwrap();
    assert!(created.message.is_none());

    let errors = recorder.of_kind(EventKind::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_source(), Some(EventKind::MessageCreate));
    assert_eq!(errors[0].extras["listener"], json!("state-store"));
    assert!(harness.state.messages().is_empty());
}

/// Tags every event for the listener after it
struct Tagger;

impl Listener for Tagger {
    fn on_event(&mut self, event: &mut Event) -> ListenerResult {
        event.extras.insert("tagged_by".to_string(), json!("tagger"));
        Ok(())
    }

    fn on_message_create(&mut self, event: &mut Event) -> ListenerResult {
        if let Some(message) = event.message.as_mut() {
            message.content = message.content.to_uppercase();
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct TagReader(Arc<Mutex<Vec<(Option<Value>, Option<String>)>>>);

impl Listener for TagReader {
    fn on_message_create(&mut self, event: &mut Event) -> ListenerResult {
        let content = event.message.as_ref().map(|m| m.content.clone());
        self.0.lock().push((event.extras.get("tagged_by").cloned(), content));
        Ok(())
    }
}

#[tokio::test]
async fn test_later_listeners_see_earlier_mutations() {
    let (mut harness, _recorder) = ready_harness(10).await;
    let reader = TagReader::default();
    harness.add_listener(Tagger).unwrap();
    harness.add_listener(reader.clone()).unwrap();

    harness.dispatch("MESSAGE_CREATE", &message(1, 100, "hello")).unwrap();
    harness.flush().await.unwrap();

    assert_eq!(
        *reader.0.lock(),
        vec![(Some(json!("tagger")), Some("HELLO".to_string()))]
    );
    // The event copy was changed, not the mirror
    assert_eq!(harness.state.message(id(1)).unwrap().content, "hello");
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_socket_events_precede_dispatch() {
    let mut harness = Harness::new(10).unwrap();
    let recorder = RecordingListener::new();
    harness.add_listener(recorder.clone()).unwrap();

    harness.transport.opened().unwrap();
    harness.frame("not json").unwrap();
    harness.frame(r#"{"op":11,"d":null}"#).unwrap();
    harness.dispatch("TYPING_START", &json!({"user_id": "1"})).unwrap();
    harness.dispatch("USER_UPDATE", &user(1, "x")).unwrap();
    harness.flush().await.unwrap();

    assert_eq!(
        recorder.kinds(),
        vec![
            EventKind::SocketOpened,
            EventKind::SocketRawReceive,
            EventKind::SocketRawReceive,
            EventKind::SocketResponse,
            EventKind::SocketRawReceive,
            EventKind::SocketResponse,
            EventKind::SocketRawReceive,
            EventKind::SocketResponse,
            EventKind::UserUpdate,
        ]
    );

    let raw = recorder.of_kind(EventKind::SocketRawReceive);
    assert_eq!(raw[0].get_str("msg"), Some("not json"));
    let response = recorder.of_kind(EventKind::SocketResponse);
    assert_eq!(response[0].get("response"), Some(&json!({"op": 11, "d": null})));
}

// ============================================================================
// Socket (mock gateway)
// ============================================================================

#[tokio::test]
async fn test_client_session_against_mock_gateway() {
    let gateway = MockGateway::start(vec![
        Step::Send(dispatch_frame("READY", &ready_payload(50))),
        Step::Expect,
        Step::Send(dispatch_frame("MESSAGE_CREATE", &message(1, 100, "over the wire"))),
        Step::Close(4000, "bye"),
    ])
    .await
    .unwrap();

    let client = GatewayClient::new(ClientConfig::new(gateway.url())).unwrap();
    let recorder = RecordingListener::new();
    client.add_listener(recorder.clone()).unwrap();

    client.run().await.unwrap();
    client.bus().flush().await.unwrap();

    let state = client.state();
    assert_eq!(state.current_user().unwrap().id, id(42));
    assert_eq!(state.message(id(1)).unwrap().content, "over the wire");

    let kinds = recorder.kinds();
    assert_eq!(kinds.first(), Some(&EventKind::SocketOpened));
    assert_eq!(kinds.last(), Some(&EventKind::SocketClosed));
    assert!(kinds.contains(&EventKind::SocketRawSend));

    let closed = recorder.last_of(EventKind::SocketClosed).unwrap();
    assert_eq!(closed.get("code"), Some(&json!(4000)));
    assert_eq!(closed.get_str("reason"), Some("bye"));

    let received = gateway.finish().await.unwrap();
    let heartbeat: Value = serde_json::from_str(&received[0]).unwrap();
    assert_eq!(heartbeat["op"], json!(1));
    assert!(heartbeat["d"].is_i64());

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_with_zero_capacities() {
    let gateway = MockGateway::start(vec![
        Step::Send(dispatch_frame("READY", &ready_payload(50))),
        Step::Expect,
        Step::Send(dispatch_frame("MESSAGE_CREATE", &message(1, 100, "one"))),
        Step::Send(dispatch_frame("MESSAGE_CREATE", &message(2, 100, "two"))),
        Step::Close(1000, ""),
    ])
    .await
    .unwrap();

    let config = ClientConfig {
        outbound_buffer: 0,
        max_messages: 0,
        ..ClientConfig::new(gateway.url())
    };
    let client = GatewayClient::new(config).unwrap();

    client.run().await.unwrap();
    client.bus().flush().await.unwrap();

    // Both capacities are treated as one
    let messages = client.state().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "two");

    let received = gateway.finish().await.unwrap();
    let heartbeat: Value = serde_json::from_str(&received[0]).unwrap();
    assert_eq!(heartbeat["op"], 1);
    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_survives_bad_frames() {
    let gateway = MockGateway::start(vec![
        Step::Send("garbage".to_string()),
        Step::Send(r#"{"op":0,"t":"READY","d":"not an object"}"#.to_string()),
        Step::Send(dispatch_frame("USER_UPDATE", &user(3, "still here"))),
        Step::Close(1000, ""),
    ])
    .await
    .unwrap();

    let client = GatewayClient::new(ClientConfig::new(gateway.url())).unwrap();
    let recorder = RecordingListener::new();
    client.add_listener(recorder.clone()).unwrap();

    client.run().await.unwrap();
    client.bus().flush().await.unwrap();

    assert_eq!(client.state().current_user().unwrap().username, "still here");
    // The READY with a non-object payload failed in the store only
    let errors = recorder.of_kind(EventKind::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_source(), Some(EventKind::Ready));

    gateway.finish().await.unwrap();
    client.shutdown().await.unwrap();
}
