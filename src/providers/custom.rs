//! Custom OpenAI-compatible provider
//!
//! The configured endpoint is the full completions URL and is called as is.
//! There is no default, and no model catalog to enumerate.

use async_trait::async_trait;
use reqwest::Client;

use super::base::{AIProvider, AIResponse, CompletionRequest, ModelListRequest, Provider, ProviderError};
use super::openai_compat::{self, ChatCompletionBody};

/// User-defined OpenAI-compatible endpoint
pub struct CustomProvider {
    client: Client,
}

impl CustomProvider {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for CustomProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for CustomProvider {
    fn kind(&self) -> AIProvider {
        AIProvider::Custom
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AIResponse, ProviderError> {
        let url = request
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(ProviderError::MissingEndpoint)?;
        let body = ChatCompletionBody::standard(request);

        openai_compat::post_chat_completion(&self.client, AIProvider::Custom, url, request, &body)
            .await?
            .into_ai_response(AIProvider::Custom, true)
    }

    async fn list_models(&self, _request: &ModelListRequest) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::base::{AICallParams, AIConfig};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(endpoint: Option<String>) -> CompletionRequest {
        let mut config = AIConfig::new(AIProvider::Custom, "llama3", "sk-local");
        config.api_endpoint = endpoint;
        AICallParams::new(config, "hello").into()
    }

    #[tokio::test]
    async fn test_missing_endpoint_fails_fast() {
        let provider = CustomProvider::new();

        let err = provider.complete(&request(None)).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingEndpoint));
        assert!(err.to_string().contains("endpoint is required"));

        let err = provider.complete(&request(Some(String::new()))).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingEndpoint));
    }

    #[tokio::test]
    async fn test_endpoint_used_as_is() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/generate"))
            .and(header("authorization", "Bearer sk-local"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "hi from custom" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = format!("{}/api/v1/generate", server.uri());
        let response = CustomProvider::new().complete(&request(Some(endpoint))).await.unwrap();
        assert_eq!(response.content, "hi from custom");
    }

    #[tokio::test]
    async fn test_response_field_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "plain text" })))
            .mount(&server)
            .await;

        let endpoint = format!("{}/generate", server.uri());
        let response = CustomProvider::new().complete(&request(Some(endpoint))).await.unwrap();
        assert_eq!(response.content, "plain text");
        assert!(response.usage.is_none());
    }

    #[tokio::test]
    async fn test_upstream_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let endpoint = format!("{}/generate", server.uri());
        let err = CustomProvider::new().complete(&request(Some(endpoint))).await.unwrap_err();
        assert_eq!(err.to_string(), "Custom API错误: Service Unavailable");
    }

    #[tokio::test]
    async fn test_upstream_json_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "invalid api key", "type": "auth_error" }
            })))
            .mount(&server)
            .await;

        let endpoint = format!("{}/generate", server.uri());
        let err = CustomProvider::new().complete(&request(Some(endpoint))).await.unwrap_err();
        assert!(matches!(err, ProviderError::Upstream { provider: AIProvider::Custom, .. }));
        assert_eq!(err.to_string(), "Custom API错误: invalid api key");
    }

    #[tokio::test]
    async fn test_list_models_is_empty() {
        let request = ModelListRequest::new(AIProvider::Custom, "anything").with_endpoint("http://unused");
        let models = CustomProvider::new().list_models(&request).await.unwrap();
        assert!(models.is_empty());
    }
}
