//! Fixed-capacity FIFO of recent messages

use std::collections::VecDeque;

use chat_core::{Message, Snowflake};

/// Recent messages, oldest first
///
/// Pushing onto a full ring evicts the oldest message. The capacity is at
/// least one.
#[derive(Debug, Clone)]
pub struct MessageRing {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl MessageRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message, returning the evicted one if the ring was full
    pub fn push(&mut self, message: Message) -> Option<Message> {
        let evicted = if self.messages.len() >= self.capacity {
            self.messages.pop_front()
        } else {
            None
        };
        self.messages.push_back(message);
        evicted
    }

    /// Insert a message, replacing one with the same id in place
    ///
    /// A replaced message keeps its slot in eviction order. Returns the
    /// evicted message when a new id was pushed onto a full ring.
    pub fn upsert(&mut self, message: Message) -> Option<Message> {
        match self.position(message.id) {
            Some(index) => {
                self.messages[index] = message;
                None
            }
            None => self.push(message),
        }
    }

    pub fn position(&self, id: Snowflake) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }

    pub fn get(&self, id: Snowflake) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Overwrite the message at `index`, keeping its place in eviction order
    pub fn replace(&mut self, index: usize, message: Message) -> Option<Message> {
        let slot = self.messages.get_mut(index)?;
        Some(std::mem::replace(slot, message))
    }

    pub fn remove(&mut self, id: Snowflake) -> Option<Message> {
        let index = self.position(id)?;
        self.messages.remove(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + '_ {
        self.messages.iter()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
