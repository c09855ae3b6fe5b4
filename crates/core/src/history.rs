//! Bounded conversation history.
//!
//! The store keeps the most recent turns in insertion order and evicts the
//! oldest one once its capacity is reached. It carries no synchronization of
//! its own; the [`Interpreter`](crate::interpreter::Interpreter) owns it behind
//! a mutex.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Capacity used when nothing else is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// One recorded command together with the model's unmodified reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    command: String,
    raw_response: String,
}

impl ConversationTurn {
    pub fn new(command: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            raw_response: raw_response.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }
}

/// A FIFO log of at most `capacity` turns.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl HistoryStore {
    /// Creates an empty store. A capacity of zero keeps nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Adds a turn at the tail, evicting from the head while over capacity.
    pub fn append(&mut self, turn: ConversationTurn) {
        if self.capacity == 0 {
            return;
        }
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Returns the turns oldest-first as an owned copy.
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
