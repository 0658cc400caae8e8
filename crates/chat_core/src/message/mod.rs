//! Message module - Chat turn types

mod turn;

pub use turn::{Role, Turn};
