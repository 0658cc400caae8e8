//! chat_state - State machine for chat exchanges
//!
//! One exchange is one user message and its reply (or failure). This crate
//! tracks where an exchange is in that lifecycle.

pub mod machine;

// Re-export commonly used types
pub use machine::{ExchangeEvent, ExchangeState, StateMachine, StateTransition, TransitionError};
