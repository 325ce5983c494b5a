//! Base types and traits for AI providers
//!
//! Defines the normalized call/response shapes every adapter converges to and
//! the `Provider` capability trait the gateway dispatches through.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::security::SecureString;

/// Default sampling temperature when the caller does not set one
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default completion budget when the caller does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Identifies which adapter and wire protocol a call uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    OpenAI,
    DeepSeek,
    Claude,
    Gemini,
    /// A user-defined OpenAI-compatible endpoint
    Custom,
}

impl AIProvider {
    /// Returns the lowercase tag used in storage and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::DeepSeek => "deepseek",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Custom => "custom",
        }
    }

    /// Returns the vendor name used in error messages and logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::DeepSeek => "DeepSeek",
            Self::Claude => "Claude",
            Self::Gemini => "Gemini",
            Self::Custom => "Custom",
        }
    }

    /// Returns the hardcoded base URL, if the provider has one
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::DeepSeek => Some("https://api.deepseek.com/v1"),
            Self::Claude => Some("https://api.anthropic.com/v1"),
            Self::Gemini => Some("https://generativelanguage.googleapis.com/v1"),
            Self::Custom => None,
        }
    }

    /// Returns all providers in display order
    pub fn all() -> &'static [AIProvider] {
        &[
            Self::OpenAI,
            Self::DeepSeek,
            Self::Claude,
            Self::Gemini,
            Self::Custom,
        ]
    }
}

impl fmt::Display for AIProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AIProvider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ProviderError::UnsupportedProvider(s.to_string()))
    }
}

/// Resolved configuration for a single call
///
/// Built fresh per call by the config resolvers. `api_key` always holds the
/// decrypted plaintext and is zeroed on drop.
#[derive(Debug, Clone, PartialEq)]
pub struct AIConfig {
    pub provider: AIProvider,
    pub model: String,
    pub api_key: SecureString,
    /// Overrides the provider's default base URL
    pub api_endpoint: Option<String>,
    /// Display label, only meaningful for `AIProvider::Custom`
    pub custom_provider_name: Option<String>,
}

impl AIConfig {
    /// Creates a config with no endpoint override
    pub fn new(provider: AIProvider, model: impl Into<String>, api_key: impl Into<SecureString>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: api_key.into(),
            api_endpoint: None,
            custom_provider_name: None,
        }
    }

    /// Sets the endpoint override
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the model, e.g. the end user's pick on a shared config
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the custom provider display label
    pub fn with_custom_provider_name(mut self, name: impl Into<String>) -> Self {
        self.custom_provider_name = Some(name.into());
        self
    }

    /// Returns the label to show for this config
    pub fn provider_label(&self) -> &str {
        match (&self.provider, self.custom_provider_name.as_deref()) {
            (AIProvider::Custom, Some(name)) if !name.trim().is_empty() => name,
            (provider, _) => provider.display_name(),
        }
    }
}

/// Parameters for one gateway invocation
#[derive(Debug, Clone)]
pub struct AICallParams {
    pub config: AIConfig,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl AICallParams {
    /// Creates params with default temperature and token budget
    pub fn new(config: AIConfig, prompt: impl Into<String>) -> Self {
        Self {
            config,
            prompt: prompt.into(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token accounting reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Builds usage from optional counters; a missing total is the sum of the parts
    pub fn from_counts(prompt: Option<u32>, completion: Option<u32>, total: Option<u32>) -> Self {
        let prompt_tokens = prompt.unwrap_or(0);
        let completion_tokens = completion.unwrap_or(0);
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: total.unwrap_or(prompt_tokens.saturating_add(completion_tokens)),
        }
    }
}

/// Normalized response, independent of vendor wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIResponse {
    pub content: String,
    /// Absent when the provider reported no usage block at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl AIResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }
}

/// Adapter input: call parameters with defaults applied
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub api_key: SecureString,
    pub model: String,
    /// Base URL override (full completions URL for `Custom`)
    pub endpoint: Option<String>,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl From<AICallParams> for CompletionRequest {
    fn from(params: AICallParams) -> Self {
        let AICallParams {
            config,
            prompt,
            system_prompt,
            temperature,
            max_tokens,
        } = params;

        Self {
            api_key: config.api_key,
            model: config.model,
            endpoint: non_blank(config.api_endpoint),
            prompt,
            system_prompt: non_blank(system_prompt),
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

/// Credentials for enumerating a provider's models
#[derive(Debug, Clone)]
pub struct ModelListRequest {
    pub provider: AIProvider,
    pub api_key: SecureString,
    pub api_endpoint: Option<String>,
}

impl ModelListRequest {
    pub fn new(provider: AIProvider, api_key: impl Into<SecureString>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            api_endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = non_blank(Some(endpoint.into()));
        self
    }
}

impl From<&AIConfig> for ModelListRequest {
    fn from(config: &AIConfig) -> Self {
        Self {
            provider: config.provider,
            api_key: config.api_key.clone(),
            api_endpoint: non_blank(config.api_endpoint.clone()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Errors raised by adapters and the dispatcher
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider tag is unknown or has no registered adapter
    #[error("不支持的AI提供商: {0}")]
    UnsupportedProvider(String),

    /// The vendor answered with a non-2xx status
    #[error("{} API错误: {message}", AIProvider::display_name(.provider))]
    Upstream {
        provider: AIProvider,
        status: StatusCode,
        message: String,
    },

    /// The request never produced an HTTP response
    #[error("{} API调用失败: {source}", AIProvider::display_name(.provider))]
    Network {
        provider: AIProvider,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the vendor's documented envelope
    #[error("{} 响应格式无效: {reason}", AIProvider::display_name(.provider))]
    InvalidResponse { provider: AIProvider, reason: String },

    /// The custom adapter was called without an endpoint
    #[error("自定义AI提供商需要配置API端点 (endpoint is required)")]
    MissingEndpoint,
}

impl ProviderError {
    pub fn invalid_response(provider: AIProvider, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider,
            reason: reason.into(),
        }
    }

    /// Returns the provider the error originated from, if any
    pub fn provider(&self) -> Option<AIProvider> {
        match self {
            Self::Upstream { provider, .. }
            | Self::Network { provider, .. }
            | Self::InvalidResponse { provider, .. } => Some(*provider),
            Self::MissingEndpoint => Some(AIProvider::Custom),
            Self::UnsupportedProvider(_) => None,
        }
    }
}

/// Capability interface implemented once per provider
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the tag this adapter serves
    fn kind(&self) -> AIProvider;

    /// Returns the vendor display name
    fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    /// Performs one completion call and normalizes the response
    async fn complete(&self, request: &CompletionRequest) -> Result<AIResponse, ProviderError>;

    /// Enumerates model identifiers, deduplicated and sorted
    async fn list_models(&self, request: &ModelListRequest) -> Result<Vec<String>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_tag_roundtrip() {
        for provider in AIProvider::all() {
            assert_eq!(provider.as_str().parse::<AIProvider>().unwrap(), *provider);
        }
    }

    #[test]
    fn test_unknown_provider_tag() {
        let err = "mistral".parse::<AIProvider>().unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedProvider(ref tag) if tag == "mistral"));
        assert_eq!(err.to_string(), "不支持的AI提供商: mistral");
    }

    #[test]
    fn test_provider_serde_lowercase() {
        let json = serde_json::to_string(&AIProvider::DeepSeek).unwrap();
        assert_eq!(json, "\"deepseek\"");
        let parsed: AIProvider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(parsed, AIProvider::OpenAI);
    }

    #[test]
    fn test_custom_has_no_default_base_url() {
        assert!(AIProvider::Custom.default_base_url().is_none());
        assert_eq!(
            AIProvider::Claude.default_base_url(),
            Some("https://api.anthropic.com/v1")
        );
    }

    #[test]
    fn test_completion_request_defaults() {
        let config = AIConfig::new(AIProvider::OpenAI, "gpt-4", "sk-test").with_endpoint("  ");
        let request = CompletionRequest::from(AICallParams::new(config, "hello"));

        assert_eq!(request.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.endpoint.is_none());
        assert!(request.system_prompt.is_none());
        assert_eq!(request.api_key, "sk-test");
    }

    #[test]
    fn test_completion_request_overrides() {
        let config = AIConfig::new(AIProvider::Claude, "claude-3-haiku", "k");
        let params = AICallParams::new(config, "p")
            .with_system_prompt("be brief")
            .with_temperature(0.3)
            .with_max_tokens(50);
        let request = CompletionRequest::from(params);

        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.max_tokens, 50);
        assert_eq!(request.system_prompt.as_deref(), Some("be brief"));
    }

    #[test]
    fn test_token_usage_total_fallback() {
        let usage = TokenUsage::from_counts(Some(10), Some(3), None);
        assert_eq!(usage.total_tokens, 13);

        let usage = TokenUsage::from_counts(None, Some(3), Some(20));
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.total_tokens, 20);
    }

    #[test]
    fn test_token_usage_total_saturates() {
        let usage = TokenUsage::from_counts(Some(u32::MAX), Some(1), None);
        assert_eq!(usage.prompt_tokens, u32::MAX);
        assert_eq!(usage.completion_tokens, 1);
        assert_eq!(usage.total_tokens, u32::MAX);
    }

    #[test]
    fn test_response_serialization_omits_missing_usage() {
        let json = serde_json::to_value(AIResponse::new("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "content": "hi" }));

        let json = serde_json::to_value(
            AIResponse::new("hi").with_usage(Some(TokenUsage::from_counts(Some(1), Some(2), None))),
        )
        .unwrap();
        assert_eq!(json["usage"]["totalTokens"], 3);
    }

    #[test]
    fn test_provider_label() {
        let config = AIConfig::new(AIProvider::Custom, "m", "k").with_custom_provider_name("My LLM");
        assert_eq!(config.provider_label(), "My LLM");
        let config = AIConfig::new(AIProvider::Gemini, "m", "k").with_custom_provider_name("ignored");
        assert_eq!(config.provider_label(), "Gemini");
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = AIConfig::new(AIProvider::OpenAI, "gpt-4", "sk-very-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
    }
}
