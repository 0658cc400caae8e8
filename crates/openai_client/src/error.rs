use chat_core::ConfigStatus;
use thiserror::Error;

use crate::api::models::ApiErrorBody;

/// Failure of a single exchange, already translated for the user.
///
/// `Display` is the message shown in the chat.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Message is empty.")]
    EmptyMessage,

    #[error("A request is already in progress. Wait for the reply before sending again.")]
    Busy,

    #[error("Invalid API key. Check your configuration.")]
    InvalidApiKey,

    #[error("Rate limit reached. Try again later.")]
    RateLimited,

    #[error("Upstream server error. Try again later.")]
    ServerError,

    #[error("Error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Connection error. Check your internet connection.")]
    Connection { detail: String },

    #[error("Unexpected response from the completion endpoint: {0}")]
    MalformedResponse(String),

    #[error("Request cancelled before a reply arrived.")]
    Cancelled,
}

impl GatewayError {
    /// Classify a non-success HTTP status with its raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => GatewayError::InvalidApiKey,
            429 => GatewayError::RateLimited,
            500 => GatewayError::ServerError,
            _ => GatewayError::Http {
                status,
                message: ApiErrorBody::message_from(body)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
        }
    }

    /// Classify a transport failure where no HTTP response was received.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("could not connect: {err}")
        } else {
            err.to_string()
        };
        GatewayError::Connection { detail }
    }

    /// The single descriptive message handed to the caller.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the failure happened before any request was issued.
    pub fn is_rejected_locally(&self) -> bool {
        matches!(self, GatewayError::EmptyMessage | GatewayError::Busy)
    }
}

/// Why a gateway could not be built.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("chat is not configured: {0:?}")]
    NotConfigured(ConfigStatus),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
