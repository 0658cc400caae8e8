use std::time::{Duration, Instant};

use async_trait::async_trait;
use chat_core::{Config, Credentials};
use log::{error, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Proxy};

use crate::api::models::{ChatCompletionRequest, ChatCompletionResponse};
use crate::client_trait::CompletionTransport;
use crate::error::GatewayError;

/// reqwest-backed transport posting to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    credentials: Credentials,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(credentials: Credentials, config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = config.request_timeout();
        let client = Self::build_http_client(config, timeout)?;
        Ok(Self {
            client,
            credentials,
            timeout,
        })
    }

    fn build_http_client(config: &Config, timeout: Duration) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder()
            .default_headers(Self::get_default_headers())
            .timeout(timeout);
        if !config.http_proxy.is_empty() {
            builder = builder.proxy(Proxy::http(&config.http_proxy)?);
        }
        if !config.https_proxy.is_empty() {
            builder = builder.proxy(Proxy::https(&config.https_proxy)?);
        }
        builder.build()
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    pub fn endpoint(&self) -> &str {
        self.credentials.endpoint()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send_chat_completion_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GatewayError> {
        let url = self.credentials.endpoint();
        info!(
            "Sending completion request to {} with {} messages",
            url,
            request.messages.len()
        );
        let start_time = Instant::now();

        let response = self
            .client
            .post(url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.credentials.api_key()),
            )
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed HTTP request to {}: {}", url, e);
                if e.is_timeout() {
                    error!("Request timed out after {:?}", self.timeout);
                }
                GatewayError::from_transport(&e)
            })?;

        let status = response.status();
        info!(
            "Got response from {} after {:?} with status {}",
            url,
            start_time.elapsed(),
            status
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!("Could not read error body: {}", e);
                String::new()
            });
            let err = GatewayError::from_status(status.as_u16(), &body);
            warn!("Completion request failed: {}", err);
            return Err(err);
        }

        let body = response.text().await.map_err(|e| {
            error!("Failed to read response body: {}", e);
            GatewayError::from_transport(&e)
        })?;

        serde_json::from_str::<ChatCompletionResponse>(&body).map_err(|e| {
            error!("Failed to parse completion response: {}", e);
            GatewayError::MalformedResponse(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_config() -> Config {
        Config {
            api_key: Some("sk-test".to_string()),
            endpoint: Some("http://localhost:9/v1/chat/completions".to_string()),
            request_timeout_secs: Some(7),
            ..Config::default()
        }
    }

    fn credentials(config: &Config) -> Credentials {
        match config.status() {
            chat_core::ConfigStatus::Ready(credentials) => credentials,
            other => panic!("expected ready config, got {other:?}"),
        }
    }

    #[test]
    fn test_new_transport() {
        let config = ready_config();
        let transport = HttpTransport::new(credentials(&config), &config).unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:9/v1/chat/completions");
        assert_eq!(transport.timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_default_headers() {
        let headers = HttpTransport::get_default_headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
    }
}
