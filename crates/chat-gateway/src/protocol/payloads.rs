//! Payload fields the transport itself reads

use serde::Deserialize;
use std::time::Duration;

/// The part of the READY payload that configures the heartbeat
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HeartbeatInfo {
    /// Heartbeat interval in milliseconds; any JSON number
    pub heartbeat_interval: f64,
}

impl HeartbeatInfo {
    /// `None` for negative, non-finite or out-of-range intervals
    #[must_use]
    pub fn interval(self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.heartbeat_interval / 1000.0).ok()
    }
}
