//! Presence status of a guild member

use serde::{Deserialize, Deserializer, Serialize};

/// Member online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// Member is online and active
    Online,
    /// Member is idle (away from keyboard)
    Idle,
    /// Do not disturb
    Dnd,
    /// Member is offline (or invisible)
    #[default]
    Offline,
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Idle => write!(f, "idle"),
            Self::Dnd => write!(f, "dnd"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            "offline" | "invisible" => Ok(Self::Offline),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

// Statuses the client does not know are shown as offline
impl<'de> Deserialize<'de> for PresenceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
    }
}
