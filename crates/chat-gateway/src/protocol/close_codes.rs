//! WebSocket close codes sent by the gateway
//!
//! Only used to describe a close in logs and in the `SOCKET_CLOSED` event.

/// Human-readable meaning of a close code
#[must_use]
pub const fn describe_close(code: Option<u16>) -> &'static str {
    match code {
        None => "No close code",
        Some(1000) => "Normal closure",
        Some(1001) => "Going away",
        Some(1006) => "Abnormal closure",
        Some(4000) => "Unknown error occurred",
        Some(4001) => "Invalid opcode sent",
        Some(4002) => "Invalid payload encoding",
        Some(4003) => "Payload sent before identifying",
        Some(4004) => "Authentication failed",
        Some(4005) => "Identified more than once",
        Some(4007) => "Invalid sequence number",
        Some(4008) => "Rate limited",
        Some(4009) => "Session timed out",
        Some(_) => "Unrecognized close code",
    }
}
