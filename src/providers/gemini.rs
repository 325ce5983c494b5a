//! Google Gemini provider implementation
//!
//! Uses `models/{model}:generateContent` with the API key in the `key` query
//! parameter. Gemini has no system role on the v1 endpoint, so the system
//! prompt is prepended to the user text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::base::{
    AIProvider, AIResponse, CompletionRequest, ModelListRequest, Provider, ProviderError, TokenUsage,
};
use super::http::{base_url, join_url, normalize_model_ids, send_json, ModelListEnvelope};

/// Resource prefix Gemini puts on model names
const MODEL_RESOURCE_PREFIX: &str = "models/";

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

impl From<&CompletionRequest> for GenerateContentBody {
    fn from(request: &CompletionRequest) -> Self {
        let text = match request.system_prompt.as_deref() {
            Some(system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        };

        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    fn into_ai_response(self) -> Result<AIResponse, ProviderError> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                ProviderError::invalid_response(
                    AIProvider::Gemini,
                    "missing candidates[0].content.parts[0].text",
                )
            })?;

        let usage = self.usage_metadata.map(|u| {
            TokenUsage::from_counts(
                u.prompt_token_count,
                u.candidates_token_count,
                u.total_token_count,
            )
        });

        Ok(AIResponse::new(text).with_usage(usage))
    }
}

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn kind(&self) -> AIProvider {
        AIProvider::Gemini
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AIResponse, ProviderError> {
        let base = base_url(AIProvider::Gemini, request.endpoint.as_deref())?;
        let model = request
            .model
            .strip_prefix(MODEL_RESOURCE_PREFIX)
            .unwrap_or(&request.model);
        let url = join_url(&base, &format!("models/{}:generateContent", model));

        let builder = self
            .client
            .post(url)
            .query(&[("key", request.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&GenerateContentBody::from(request));

        let response: GenerateContentResponse =
            send_json(&self.client, AIProvider::Gemini, builder).await?;
        response.into_ai_response()
    }

    async fn list_models(&self, request: &ModelListRequest) -> Result<Vec<String>, ProviderError> {
        let base = base_url(AIProvider::Gemini, request.api_endpoint.as_deref())?;
        let builder = self
            .client
            .get(join_url(&base, "models"))
            .query(&[("key", request.api_key.as_str())]);

        let envelope: ModelListEnvelope = send_json(&self.client, AIProvider::Gemini, builder).await?;
        Ok(normalize_model_ids(envelope.identifiers().map(|id| {
            id.strip_prefix(MODEL_RESOURCE_PREFIX)
                .map(str::to_string)
                .unwrap_or(id)
        })))
    }
}
