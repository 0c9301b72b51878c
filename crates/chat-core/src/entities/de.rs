//! Lenient field decoding shared by the entity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ModelError;

/// Accept either a JSON string or a number and keep it as text
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Parse a gateway timestamp (RFC 3339, any offset) into UTC
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, ModelError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ModelError::InvalidTimestamp {
            field: field.to_string(),
            value: raw.to_string(),
        })
}
