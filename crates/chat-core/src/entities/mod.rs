//! Entities mirrored from the gateway

pub(crate) mod de;

mod channel;
mod guild;
mod member;
mod message;
mod presence;
mod role;
mod user;

pub use channel::{AnyChannel, Channel, ChannelRef, ChannelType, PrivateChannel};
pub use de::parse_timestamp;
pub use guild::Guild;
pub use member::{Member, VoiceState};
pub use message::Message;
pub use presence::PresenceStatus;
pub use role::Role;
pub use user::User;
