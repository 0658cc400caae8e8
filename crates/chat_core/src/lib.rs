//! chat_core - Core types for the chat relay
//!
//! This crate provides the types shared by the gateway and the front-end:
//! - `message` - Role and Turn
//! - `context` - the bounded Conversation window
//! - `config` - endpoint credentials loaded from `config.toml` and the environment

pub mod config;
pub mod context;
pub mod message;

// Re-export commonly used types
pub use config::{Config, ConfigError, ConfigStatus, Credentials};
pub use context::{Conversation, MAX_CONVERSATION_TURNS};
pub use message::{Role, Turn};
