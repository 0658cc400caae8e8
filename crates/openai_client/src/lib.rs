pub mod api;
pub mod client_trait;
pub mod error;
pub mod gateway;

pub use api::client::HttpTransport;
pub use api::models::{ChatCompletionRequest, ChatCompletionResponse, MAX_TOKENS, TEMPERATURE};
pub use client_trait::CompletionTransport;
pub use error::{GatewayError, InitError};
pub use gateway::{CompletionGateway, DEFAULT_SYSTEM_INSTRUCTION};
