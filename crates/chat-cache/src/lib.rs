//! # chat-cache
//!
//! Local mirror of remote gateway state.
//!
//! ## Features
//!
//! - **State store**: a listener that rebuilds guilds, channels, members,
//!   roles and recent messages from dispatch events
//! - **Reference resolution**: resolved entities are attached to each event
//!   before later listeners see it
//! - **Message ring**: bounded FIFO of recent messages
//! - **Read handle**: cloneable, lock-protected lookups for application code
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::StateStore;
//!
//! let store = StateStore::new(5000);
//! let state = store.handle();
//! bus.add_listener(store).await?;
//!
//! // later, from any task
//! if let Some(channel) = state.channel(channel_id) {
//!     println!("{}", channel.id());
//! }
//! ```

pub mod builder;
pub mod mirror;
pub mod payloads;
pub mod ring;
pub mod store;

pub use mirror::Mirror;
pub use ring::MessageRing;
pub use store::{StateHandle, StateStore};
