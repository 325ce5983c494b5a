//! AI gateway - the single entry point for completion calls
//!
//! `call_ai` looks up the adapter for `params.config.provider` and forwards
//! the call unchanged: no caching, retries or timeouts at this layer.
//! `test_connection` wraps one fixed low-cost call and reports the outcome as
//! data instead of an error.

use std::sync::OnceLock;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::list_with_registry;
use crate::providers::{
    AICallParams, AIConfig, AIResponse, CompletionRequest, ModelListRequest, ProviderError,
    ProviderRegistry, TokenUsage,
};
use crate::security::Sanitizer;

pub const CONNECTION_TEST_SYSTEM_PROMPT: &str = "你是一个AI助手，请用一句话简短回复。";
pub const CONNECTION_TEST_PROMPT: &str = "请回复“连接成功”。";
pub const CONNECTION_TEST_TEMPERATURE: f64 = 0.3;
pub const CONNECTION_TEST_MAX_TOKENS: u32 = 50;

/// What a successful connection test saw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDetails {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Outcome of `test_connection`; failures are carried, never raised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ConnectionDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionTestResult {
    pub fn succeeded(response: AIResponse) -> Self {
        Self {
            success: true,
            details: Some(ConnectionDetails {
                response: response.content,
                usage: response.usage,
            }),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            details: None,
            error: Some(error.into()),
        }
    }
}

/// Dispatches calls to the registered provider adapters
#[derive(Clone, Default)]
pub struct AiGateway {
    registry: ProviderRegistry,
}

impl AiGateway {
    /// Creates a gateway with all built-in adapters
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Creates a gateway whose adapters share `client`
    pub fn with_client(client: Client) -> Self {
        Self::with_registry(ProviderRegistry::new(client))
    }

    pub fn with_registry(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Performs one completion call through the adapter for the config's provider
    pub async fn call_ai(&self, params: AICallParams) -> Result<AIResponse, ProviderError> {
        let kind = params.config.provider;
        let provider = self.registry.require(kind)?;

        tracing::debug!(
            provider = kind.as_str(),
            model = params.config.model.as_str(),
            key = %Sanitizer::sanitize_token(&params.config.api_key),
            "Dispatching AI call"
        );

        let request = CompletionRequest::from(params);
        provider.complete(&request).await
    }

    /// Lists models for the given credentials
    pub async fn list_models(&self, request: &ModelListRequest) -> Result<Vec<String>, ProviderError> {
        list_with_registry(&self.registry, request).await
    }

    /// Issues a short fixed prompt to check credentials and reachability
    pub async fn test_connection(&self, config: &AIConfig) -> ConnectionTestResult {
        let params = AICallParams::new(config.clone(), CONNECTION_TEST_PROMPT)
            .with_system_prompt(CONNECTION_TEST_SYSTEM_PROMPT)
            .with_temperature(CONNECTION_TEST_TEMPERATURE)
            .with_max_tokens(CONNECTION_TEST_MAX_TOKENS);

        match self.call_ai(params).await {
            Ok(response) => {
                tracing::info!(
                    provider = config.provider.as_str(),
                    model = config.model.as_str(),
                    "Connection test succeeded"
                );
                ConnectionTestResult::succeeded(response)
            }
            Err(e) => {
                tracing::warn!(
                    provider = config.provider.as_str(),
                    model = config.model.as_str(),
                    "Connection test failed: {}",
                    e
                );
                ConnectionTestResult::failed(e.to_string())
            }
        }
    }
}

/// Returns the process-wide gateway used by the free functions
pub fn default_gateway() -> &'static AiGateway {
    static GATEWAY: OnceLock<AiGateway> = OnceLock::new();
    GATEWAY.get_or_init(AiGateway::new)
}

/// Performs one completion call through the default gateway
pub async fn call_ai(params: AICallParams) -> Result<AIResponse, ProviderError> {
    default_gateway().call_ai(params).await
}

/// Runs a connection test through the default gateway
pub async fn test_ai_connection(config: &AIConfig) -> ConnectionTestResult {
    default_gateway().test_connection(config).await
}
