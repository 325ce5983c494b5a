//! OpenAI provider implementation
//!
//! Chat completions over `/chat/completions` with bearer auth. Newer model
//! families reject `max_tokens` and custom temperatures, so the body is shaped
//! from the model name.

use async_trait::async_trait;
use reqwest::Client;

use super::base::{AIProvider, AIResponse, CompletionRequest, ModelListRequest, Provider, ProviderError};
use super::http::{base_url, join_url};
use super::openai_compat::{self, ChatCompletionBody};

/// Models that take `max_completion_tokens` instead of `max_tokens`
pub fn uses_max_completion_tokens(model: &str) -> bool {
    model.contains("o1")
        || model.contains("gpt-4o")
        || model.starts_with("o1-")
        || model.starts_with("gpt-5")
}

/// Models that accept a caller-chosen temperature
///
/// Any name containing "mini" is treated like the o1 family.
pub fn supports_temperature(model: &str) -> bool {
    !(model.contains("o1") || model.starts_with("o1-") || model.contains("mini"))
}

/// OpenAI provider
pub struct OpenAIProvider {
    client: Client,
}

impl OpenAIProvider {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Creates a provider sharing an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build_body(request: &CompletionRequest) -> ChatCompletionBody<'_> {
        let mut body = ChatCompletionBody::standard(request);

        if uses_max_completion_tokens(&request.model) {
            body.max_tokens = None;
            body.max_completion_tokens = Some(request.max_tokens);
        }
        if !supports_temperature(&request.model) {
            body.temperature = None;
        }

        body
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn kind(&self) -> AIProvider {
        AIProvider::OpenAI
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AIResponse, ProviderError> {
        let base = base_url(AIProvider::OpenAI, request.endpoint.as_deref())?;
        let url = join_url(&base, "chat/completions");
        let body = Self::build_body(request);

        openai_compat::post_chat_completion(&self.client, AIProvider::OpenAI, &url, request, &body)
            .await?
            .into_ai_response(AIProvider::OpenAI, false)
    }

    async fn list_models(&self, request: &ModelListRequest) -> Result<Vec<String>, ProviderError> {
        openai_compat::list_bearer_models(&self.client, AIProvider::OpenAI, request).await
    }
}
