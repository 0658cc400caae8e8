//! Context module - Conversation history
//!
//! Holds the ordered turns that are replayed upstream on every request.

mod conversation;

pub use conversation::{Conversation, MAX_CONVERSATION_TURNS};
