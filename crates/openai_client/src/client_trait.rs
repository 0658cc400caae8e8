use async_trait::async_trait;

use crate::api::models::{ChatCompletionRequest, ChatCompletionResponse};
use crate::error::GatewayError;

/// Issues one completion request and classifies any failure.
///
/// Implementations perform exactly one call per invocation and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send_chat_completion_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GatewayError>;
}
