//! Events and listeners

mod event;
mod event_kind;
mod listener;

pub use event::{Event, ERROR_LISTENER_KEY, ERROR_MESSAGE_KEY, ERROR_SOURCE_KEY};
pub use event_kind::EventKind;
pub use listener::{route, Listener, ListenerError, ListenerResult};
