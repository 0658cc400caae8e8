//! Conversation - Bounded, insertion-ordered log of turns
//!
//! The conversation is the prompt history sent upstream on every request.
//! It never holds more than its window; the oldest turns are dropped first.

use std::collections::VecDeque;

use crate::message::Turn;

/// Default number of turns kept in the window.
pub const MAX_CONVERSATION_TURNS: usize = 20;

/// Ordered chat history with a fixed-size window.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Create an empty conversation with the default window.
    pub fn new() -> Self {
        Self::with_window(MAX_CONVERSATION_TURNS)
    }

    /// Create an empty conversation keeping at most `max_turns` turns.
    ///
    /// A window of zero is raised to one so the latest turn is always kept.
    pub fn with_window(max_turns: usize) -> Self {
        let max_turns = max_turns.max(1);
        Self {
            turns: VecDeque::with_capacity(max_turns + 1),
            max_turns,
        }
    }

    /// Append a turn at the end, dropping the oldest turns past the window.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Copy of every turn, oldest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
