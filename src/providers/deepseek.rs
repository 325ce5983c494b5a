//! DeepSeek provider implementation
//!
//! DeepSeek speaks the OpenAI chat-completions dialect without the model-name
//! parameter rules, so every call sends `temperature` and `max_tokens`.

use async_trait::async_trait;
use reqwest::Client;

use super::base::{AIProvider, AIResponse, CompletionRequest, ModelListRequest, Provider, ProviderError};
use super::http::{base_url, join_url};
use super::openai_compat::{self, ChatCompletionBody};

/// DeepSeek provider
pub struct DeepSeekProvider {
    client: Client,
}

impl DeepSeekProvider {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for DeepSeekProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for DeepSeekProvider {
    fn kind(&self) -> AIProvider {
        AIProvider::DeepSeek
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AIResponse, ProviderError> {
        let base = base_url(AIProvider::DeepSeek, request.endpoint.as_deref())?;
        let url = join_url(&base, "chat/completions");
        let body = ChatCompletionBody::standard(request);

        openai_compat::post_chat_completion(&self.client, AIProvider::DeepSeek, &url, request, &body)
            .await?
            .into_ai_response(AIProvider::DeepSeek, false)
    }

    async fn list_models(&self, request: &ModelListRequest) -> Result<Vec<String>, ProviderError> {
        openai_compat::list_bearer_models(&self.client, AIProvider::DeepSeek, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::base::{AICallParams, AIConfig};
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(server: &MockServer) -> CompletionRequest {
        let config =
            AIConfig::new(AIProvider::DeepSeek, "deepseek-chat", "sk-ds").with_endpoint(server.uri());
        AICallParams::new(config, "你好").with_max_tokens(300).into()
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-ds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "你好！" } }],
                "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
            })))
            .mount(&server)
            .await;

        let response = DeepSeekProvider::new().complete(&request(&server)).await.unwrap();
        assert_eq!(response.content, "你好！");
        assert_eq!(response.usage.unwrap().total_tokens, 5);

        let sent: Value = server.received_requests().await.unwrap()[0].body_json().unwrap();
        assert_eq!(sent["max_tokens"], 300);
        assert_eq!(sent["temperature"], 0.7);
    }

    #[tokio::test]
    async fn test_upstream_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": { "message": "Insufficient Balance" }
            })))
            .mount(&server)
            .await;

        let err = DeepSeekProvider::new().complete(&request(&server)).await.unwrap_err();
        assert_eq!(err.to_string(), "DeepSeek API错误: Insufficient Balance");
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": "deepseek-reasoner" }, { "id": "deepseek-chat" }]
            })))
            .mount(&server)
            .await;

        let request = ModelListRequest::new(AIProvider::DeepSeek, "sk-ds").with_endpoint(server.uri());
        let models = DeepSeekProvider::new().list_models(&request).await.unwrap();
        assert_eq!(models, vec!["deepseek-chat", "deepseek-reasoner"]);
    }
}
