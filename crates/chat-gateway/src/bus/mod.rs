//! Event bus
//!
//! Serializes every event through one actor task that delivers it to the
//! registered listeners in order.

mod dispatcher;

pub use dispatcher::EventBus;
