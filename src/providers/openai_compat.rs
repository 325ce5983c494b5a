//! OpenAI-style chat completion wire types
//!
//! Shared by the OpenAI, DeepSeek and Custom adapters, which all speak the
//! `/chat/completions` dialect.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::base::{
    AIProvider, AIResponse, CompletionRequest, ModelListRequest, ProviderError, TokenUsage,
};
use super::http::{base_url, join_url, normalize_model_ids, send_json, ModelListEnvelope};

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Builds the message list: optional system turn, then the user prompt
pub(crate) fn chat_messages(request: &CompletionRequest) -> Vec<ChatMessage<'_>> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system_prompt.as_deref() {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });
    messages
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

impl<'a> ChatCompletionBody<'a> {
    /// Plain body: `temperature` and `max_tokens` always set
    pub(crate) fn standard(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: chat_messages(request),
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            max_completion_tokens: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<CompletionUsage>,
    /// Non-standard top-level text some self-hosted servers return
    response: Option<String>,
}

impl ChatCompletionResponse {
    /// Normalizes `choices[0].message.content`
    ///
    /// With `allow_response_field`, a top-level `response` string is accepted
    /// when the choice content is absent.
    pub(crate) fn into_ai_response(
        self,
        provider: AIProvider,
        allow_response_field: bool,
    ) -> Result<AIResponse, ProviderError> {
        let usage = self
            .usage
            .map(|u| TokenUsage::from_counts(u.prompt_tokens, u.completion_tokens, u.total_tokens));

        let choice_content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);

        let content = match (choice_content, self.response) {
            (Some(content), _) => content,
            (None, Some(text)) if allow_response_field => text,
            _ => {
                return Err(ProviderError::invalid_response(
                    provider,
                    "missing choices[0].message.content",
                ))
            }
        };

        Ok(AIResponse::new(content).with_usage(usage))
    }
}

/// POSTs a chat completion body with bearer auth and decodes the reply
pub(crate) async fn post_chat_completion(
    client: &Client,
    provider: AIProvider,
    url: &str,
    request: &CompletionRequest,
    body: &ChatCompletionBody<'_>,
) -> Result<ChatCompletionResponse, ProviderError> {
    let builder = client
        .post(url)
        .header("Authorization", request.api_key.bearer())
        .header("Content-Type", "application/json")
        .json(body);

    send_json(client, provider, builder).await
}

/// Lists models from a bearer-authenticated `GET {base}/models`
pub(crate) async fn list_bearer_models(
    client: &Client,
    provider: AIProvider,
    request: &ModelListRequest,
) -> Result<Vec<String>, ProviderError> {
    let base = base_url(provider, request.api_endpoint.as_deref())?;
    let builder = client
        .get(join_url(&base, "models"))
        .header("Authorization", request.api_key.bearer());

    let envelope: ModelListEnvelope = send_json(client, provider, builder).await?;
    Ok(normalize_model_ids(envelope.identifiers()))
}
