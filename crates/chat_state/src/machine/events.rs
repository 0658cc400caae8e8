//! Exchange events - Defines events that trigger state transitions

use serde::{Deserialize, Serialize};

/// Defines the events that can trigger state transitions in the FSM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeEvent {
    /// The completion request was handed to the transport.
    RequestSent,

    /// A reply was extracted from a successful response.
    ReplyReceived,

    /// The request failed; `error` is the user-facing message.
    RequestFailed { error: String },
}

impl ExchangeEvent {
    /// Short event name used in transition errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestSent => "request_sent",
            Self::ReplyReceived => "reply_received",
            Self::RequestFailed { .. } => "request_failed",
        }
    }
}
