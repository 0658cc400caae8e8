//! Exchange states - Defines all possible states of a chat exchange

use serde::{Deserialize, Serialize};

/// Lifecycle of one exchange: `Idle -> AwaitingResponse -> Delivered | Failed`.
///
/// Both outcomes are terminal. There is no retry or cancellation state; a new
/// exchange starts from a fresh machine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeState {
    /// No request has been issued yet.
    #[default]
    Idle,

    /// The request is in flight.
    AwaitingResponse,

    /// The reply was received and recorded.
    Delivered,

    /// The exchange failed.
    Failed {
        error_message: String,
        failed_at: String, // RFC 3339 timestamp
    },
}

impl ExchangeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Failed { .. })
    }
}
