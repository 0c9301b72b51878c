//! Role entity - a guild role with permissions

use serde::Serialize;

use crate::value_objects::{Permissions, Snowflake};

/// Role entity
///
/// `everyone` is set for the implicit role every member holds; that role
/// shares its id with the owning guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    pub color: u32,
    pub hoist: bool,
    pub position: i32,
    pub permissions: Permissions,
    pub managed: bool,
    pub everyone: bool,
}

impl Role {
    /// Create a new Role
    pub fn new(id: Snowflake, name: impl Into<String>, permissions: Permissions) -> Self {
        Self {
            id,
            name: name.into(),
            color: 0,
            hoist: false,
            position: 0,
            permissions,
            managed: false,
            everyone: false,
        }
    }

    /// Create the @everyone role for a guild
    pub fn everyone(guild_id: Snowflake) -> Self {
        Self {
            everyone: true,
            ..Self::new(guild_id, "@everyone", Permissions::empty())
        }
    }
}
