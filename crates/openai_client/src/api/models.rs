use chat_core::Turn;
use serde::{Deserialize, Serialize};

pub const MAX_TOKENS: u32 = 1000;
pub const TEMPERATURE: f64 = 0.7;

/// Body of `POST <endpoint>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Turn>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ChatCompletionRequest {
    /// Build a request with the system instruction as the first message.
    pub fn new(
        model: impl Into<String>,
        system_instruction: impl Into<String>,
        history: Vec<Turn>,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Turn::system(system_instruction));
        messages.extend(history);

        Self {
            model: model.into(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Content of the first choice, the only part of the response that is consumed.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }

    /// Convenience constructor for a single-choice assistant reply.
    pub fn with_reply(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                index: 0,
                message: ResponseMessage {
                    role: Some("assistant".to_string()),
                    content: Some(content.into()),
                },
                finish_reason: Some("stop".to_string()),
            }],
            ..Self::default()
        }
    }
}

/// Error body returned by OpenAI-compatible endpoints: `{"error": {"message": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// Extract `error.message` from a raw error body, if present.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .and_then(|detail| detail.message)
            .filter(|message| !message.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatCompletionRequest::new(
            "gpt-3.5-turbo",
            "Be helpful",
            vec![Turn::user("Hi"), Turn::assistant("Hello!"), Turn::user("Bye")],
        );

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["temperature"], 0.7);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], serde_json::json!({"role": "system", "content": "Be helpful"}));
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["content"], "Bye");
    }

    #[test]
    fn test_parse_success_response() {
        let data = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-3.5-turbo",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Hola"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 9, "completion_tokens": 1, "total_tokens": 10}
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(data).unwrap();
        assert_eq!(response.first_content(), Some("Hola"));
        assert_eq!(response.usage.unwrap().total_tokens, 10);
    }

    #[test]
    fn test_first_content_missing() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(response.first_content(), None);

        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(response.first_content(), None);
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"message":"Invalid model","type":"invalid_request_error","code":"model_not_found"}}"#;
        assert_eq!(ApiErrorBody::message_from(body).as_deref(), Some("Invalid model"));
        assert_eq!(ApiErrorBody::message_from("<html>bad gateway</html>"), None);
        assert_eq!(ApiErrorBody::message_from(r#"{"error":{}}"#), None);
    }
}
