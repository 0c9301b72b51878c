//! The event value passed through one dispatch sweep
//!
//! An event carries the raw payload map exactly as received plus a set of
//! resolved-entity slots. The state store fills the slots before any other
//! listener runs; later listeners read them (and may set `extras` for the
//! listeners after them).

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{EventKind, ListenerError};
use crate::entities::{AnyChannel, Guild, Member, Message, Role, User};
use crate::value_objects::Snowflake;

/// Key under which error events record the failed event's kind
pub const ERROR_SOURCE_KEY: &str = "source";
/// Key under which error events record the failure text
pub const ERROR_MESSAGE_KEY: &str = "error";
/// Key under which error events record the failing listener
pub const ERROR_LISTENER_KEY: &str = "listener";

#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    payload: Map<String, Value>,

    pub guild: Option<Guild>,
    pub channel: Option<AnyChannel>,
    pub member: Option<Member>,
    pub role: Option<Role>,
    pub user: Option<User>,
    pub message: Option<Message>,
    pub old_message: Option<Message>,
    pub new_message: Option<Message>,

    /// Pass-through values attached by listeners
    pub extras: Map<String, Value>,
}

impl Event {
    pub fn new(kind: EventKind, payload: Map<String, Value>) -> Self {
        Self {
            kind,
            payload,
            guild: None,
            channel: None,
            member: None,
            role: None,
            user: None,
            message: None,
            old_message: None,
            new_message: None,
            extras: Map::new(),
        }
    }

    /// Build an event from a frame's `d` value
    ///
    /// Objects are used as-is; `null` becomes an empty payload; any other
    /// value is wrapped under the `d` key.
    pub fn from_value(kind: EventKind, data: Value) -> Self {
        let payload = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("d".to_string(), other);
                map
            }
        };
        Self::new(kind, payload)
    }

    /// Build the error event reported when a listener fails
    ///
    /// The failed event's payload is carried over untouched.
    pub fn error(source: &Event, listener: &str, error: &ListenerError) -> Self {
        let mut event = Self::new(EventKind::Error, source.payload.clone());
        event.extras.insert(
            ERROR_SOURCE_KEY.to_string(),
            Value::String(source.kind.as_str().to_string()),
        );
        event.extras.insert(
            ERROR_MESSAGE_KEY.to_string(),
            Value::String(error.to_string()),
        );
        event.extras.insert(
            ERROR_LISTENER_KEY.to_string(),
            Value::String(listener.to_string()),
        );
        event
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[inline]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Raw payload field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// String payload field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Id payload field, accepting string or numeric ids
    pub fn get_id(&self, key: &str) -> Option<Snowflake> {
        match self.payload.get(key)? {
            Value::String(s) => Snowflake::parse(s).ok(),
            Value::Number(n) => n.as_u64().map(Snowflake::new),
            _ => None,
        }
    }

    /// Decode the whole payload into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ListenerError> {
        serde_json::from_value(Value::Object(self.payload.clone())).map_err(|source| {
            ListenerError::Payload {
                kind: self.kind,
                source,
            }
        })
    }

    /// Kind of the event whose failure produced this error event
    pub fn error_source(&self) -> Option<EventKind> {
        let name = self.extras.get(ERROR_SOURCE_KEY)?.as_str()?;
        EventKind::DISPATCH
            .into_iter()
            .chain([
                EventKind::SocketOpened,
                EventKind::SocketClosed,
                EventKind::SocketRawReceive,
                EventKind::SocketResponse,
                EventKind::SocketRawSend,
            ])
            .find(|k| k.as_str() == name)
    }

    /// Failure text carried by an error event
    pub fn error_message(&self) -> Option<&str> {
        self.extras.get(ERROR_MESSAGE_KEY).and_then(Value::as_str)
    }
}
