//! Message entity - a chat message kept in the recent-message ring

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::de::parse_timestamp;
use super::{ChannelRef, User};
use crate::error::ModelError;
use crate::value_objects::Snowflake;

/// Message entity
///
/// Fields the client does not model are kept verbatim in `extras`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel: ChannelRef,
    pub author: User,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub tts: bool,
    pub mention_everyone: bool,
    pub mentions: Vec<User>,
    pub extras: Map<String, Value>,
}

impl Message {
    /// Create a new Message
    pub fn new(id: Snowflake, channel: ChannelRef, author: User, content: impl Into<String>) -> Self {
        Self {
            id,
            channel,
            author,
            content: content.into(),
            timestamp: None,
            edited_timestamp: None,
            tts: false,
            mention_everyone: false,
            mentions: Vec::new(),
            extras: Map::new(),
        }
    }

    /// Id of the channel the message was posted in
    #[inline]
    pub fn channel_id(&self) -> Snowflake {
        self.channel.channel_id()
    }

    /// Check if the message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    /// Apply one field of a partial update
    ///
    /// `channel_id` and `author` never change after creation and are ignored.
    /// Any field whose name contains `time` is parsed as a timestamp.
    pub fn apply_field(&mut self, field: &str, value: &Value) -> Result<(), ModelError> {
        match field {
            "id" | "channel_id" | "author" => Ok(()),
            f if f.contains("time") => self.apply_time_field(f, value),
            "content" => {
                self.content = expect_str(field, value)?.to_string();
                Ok(())
            }
            "tts" => {
                self.tts = expect_bool(field, value)?;
                Ok(())
            }
            "mention_everyone" => {
                self.mention_everyone = expect_bool(field, value)?;
                Ok(())
            }
            "mentions" => {
                self.mentions = serde_json::from_value(value.clone()).map_err(|e| {
                    ModelError::InvalidField {
                        field: field.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(())
            }
            _ => {
                self.extras.insert(field.to_string(), value.clone());
                Ok(())
            }
        }
    }

    fn apply_time_field(&mut self, field: &str, value: &Value) -> Result<(), ModelError> {
        let parsed = match value {
            Value::Null => None,
            Value::String(raw) => Some(parse_timestamp(field, raw)?),
            other => {
                return Err(ModelError::InvalidField {
                    field: field.to_string(),
                    reason: format!("expected timestamp string, got {other}"),
                })
            }
        };

        match field {
            "timestamp" => self.timestamp = parsed,
            "edited_timestamp" => self.edited_timestamp = parsed,
            _ => {
                let normalized = parsed.map_or(Value::Null, |dt| Value::String(dt.to_rfc3339()));
                self.extras.insert(field.to_string(), normalized);
            }
        }
        Ok(())
    }
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, ModelError> {
    value.as_str().ok_or_else(|| ModelError::InvalidField {
        field: field.to_string(),
        reason: format!("expected string, got {value}"),
    })
}

fn expect_bool(field: &str, value: &Value) -> Result<bool, ModelError> {
    value.as_bool().ok_or_else(|| ModelError::InvalidField {
        field: field.to_string(),
        reason: format!("expected bool, got {value}"),
    })
}
