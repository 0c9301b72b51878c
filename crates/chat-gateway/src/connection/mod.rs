//! Socket-side plumbing
//!
//! Frame handling, the outbound write path and the heartbeat task.

mod heartbeat;
mod outbound;
mod transport;

pub use heartbeat::Heartbeat;
pub use outbound::{Frame, Outbound};
pub use transport::{FrameAction, GatewayTransport};
