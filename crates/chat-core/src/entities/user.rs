//! User entity - a global account identity, not scoped to any guild

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// User as sent by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "crate::entities::de::string_or_number")]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, username: impl Into<String>, discriminator: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            discriminator: discriminator.into(),
            avatar: None,
            bot: false,
        }
    }

    /// Get the full tag: username#discriminator
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }
}
