//! Claude provider implementation
//!
//! Talks to the Anthropic Messages API (`POST /messages`) using `x-api-key`
//! auth and a pinned `anthropic-version`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::base::{
    AIProvider, AIResponse, CompletionRequest, ModelListRequest, Provider, ProviderError, TokenUsage,
};
use super::http::{base_url, join_url, normalize_model_ids, send_json, ModelListEnvelope};

/// API version header value sent with every request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ClaudeMessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ClaudeMessage<'a>>,
}

impl<'a> From<&'a CompletionRequest> for ClaudeMessagesBody<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_prompt.as_deref(),
            messages: vec![ClaudeMessage {
                role: "user",
                content: &request.prompt,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClaudeContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ClaudeMessagesResponse {
    #[serde(default)]
    content: Vec<ClaudeContentBlock>,
    usage: Option<ClaudeUsage>,
}

impl ClaudeMessagesResponse {
    fn into_ai_response(self) -> Result<AIResponse, ProviderError> {
        let text = self
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| {
                ProviderError::invalid_response(AIProvider::Claude, "missing content[0].text")
            })?;

        let usage = self
            .usage
            .map(|u| TokenUsage::from_counts(u.input_tokens, u.output_tokens, None));

        Ok(AIResponse::new(text).with_usage(usage))
    }
}

/// Claude (Anthropic) provider
pub struct ClaudeProvider {
    client: Client,
}

impl ClaudeProvider {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ClaudeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for ClaudeProvider {
    fn kind(&self) -> AIProvider {
        AIProvider::Claude
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AIResponse, ProviderError> {
        let base = base_url(AIProvider::Claude, request.endpoint.as_deref())?;
        let body = ClaudeMessagesBody::from(request);

        let builder = self
            .client
            .post(join_url(&base, "messages"))
            .header("x-api-key", request.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body);

        let response: ClaudeMessagesResponse =
            send_json(&self.client, AIProvider::Claude, builder).await?;
        response.into_ai_response()
    }

    async fn list_models(&self, request: &ModelListRequest) -> Result<Vec<String>, ProviderError> {
        let base = base_url(AIProvider::Claude, request.api_endpoint.as_deref())?;
        let builder = self
            .client
            .get(join_url(&base, "models"))
            .header("x-api-key", request.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION);

        let envelope: ModelListEnvelope = send_json(&self.client, AIProvider::Claude, builder).await?;
        Ok(normalize_model_ids(envelope.identifiers()))
    }
}
