//! Gateway envelope
//!
//! Every frame on the socket is a JSON object of the form
//! `{"op": int, "d": payload|null, "t": name|null, "s": seq|null}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::OpCode;

/// Wire envelope
///
/// `op` is kept as the raw number so frames with op codes this client does
/// not know still decode and can be logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub op: u8,

    /// Event name (dispatch frames only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (dispatch frames only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    /// Heartbeat frame carrying the current unix time in seconds
    #[must_use]
    pub fn heartbeat(unix_seconds: i64) -> Self {
        Self {
            op: OpCode::Heartbeat.as_u8(),
            t: None,
            s: None,
            d: Some(Value::from(unix_seconds)),
        }
    }

    /// The known op code, if any
    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::from_u8(self.op)
    }

    #[inline]
    pub fn is_dispatch(&self) -> bool {
        self.op == OpCode::Dispatch.as_u8()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.opcode() {
            Some(op) => write!(f, "GatewayMessage(op={op}")?,
            None => write!(f, "GatewayMessage(op={}", self.op)?,
        }
        if let Some(t) = &self.t {
            write!(f, ", t={t}")?;
        }
        if let Some(s) = self.s {
            write!(f, ", s={s}")?;
        }
        write!(f, ")")
    }
}
