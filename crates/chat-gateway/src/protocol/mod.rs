//! Gateway protocol definitions
//!
//! Op codes, the wire envelope, and close codes.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::describe_close;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::HeartbeatInfo;
