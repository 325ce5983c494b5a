//! Provider module - Defines the Provider trait and the per-vendor adapters
//!
//! Each adapter translates a normalized `CompletionRequest` into one vendor's
//! wire format and back. The registry maps an `AIProvider` tag to its adapter
//! so dispatch never grows a conditional chain.

mod base;
mod claude;
mod custom;
mod deepseek;
mod gemini;
mod http;
mod openai;
mod openai_compat;

pub use base::*;
pub use claude::{ClaudeProvider, ANTHROPIC_VERSION};
pub use custom::CustomProvider;
pub use deepseek::DeepSeekProvider;
pub use gemini::GeminiProvider;
pub use openai::{supports_temperature, uses_max_completion_tokens, OpenAIProvider};

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;

/// Registry of provider adapters keyed by tag
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<AIProvider, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Creates a registry with all built-in adapters sharing one HTTP client
    pub fn new(client: Client) -> Self {
        let mut registry = Self::empty();

        registry.register(Arc::new(OpenAIProvider::with_client(client.clone())));
        registry.register(Arc::new(DeepSeekProvider::with_client(client.clone())));
        registry.register(Arc::new(ClaudeProvider::with_client(client.clone())));
        registry.register(Arc::new(GeminiProvider::with_client(client.clone())));
        registry.register(Arc::new(CustomProvider::with_client(client)));

        registry
    }

    /// Creates a registry with no adapters
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Registers an adapter, replacing any previous one for the same tag
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.kind(), provider);
    }

    /// Gets the adapter for a tag
    pub fn get(&self, kind: AIProvider) -> Option<Arc<dyn Provider>> {
        self.providers.get(&kind).cloned()
    }

    /// Gets the adapter for a tag or the unsupported-provider error
    pub fn require(&self, kind: AIProvider) -> Result<Arc<dyn Provider>, ProviderError> {
        self.get(kind)
            .ok_or_else(|| ProviderError::UnsupportedProvider(kind.to_string()))
    }

    /// Gets all registered tags in display order
    pub fn kinds(&self) -> Vec<AIProvider> {
        AIProvider::all()
            .iter()
            .copied()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    /// Gets metadata for all registered adapters
    pub fn metadata(&self) -> Vec<ProviderMetadata> {
        self.kinds()
            .into_iter()
            .map(|kind| ProviderMetadata {
                id: kind.as_str().to_string(),
                name: kind.display_name().to_string(),
                default_base_url: kind.default_base_url().map(str::to_string),
                lists_models: kind != AIProvider::Custom,
            })
            .collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

/// Metadata about a provider (serializable, for settings dropdowns)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    pub id: String,
    pub name: String,
    pub default_base_url: Option<String>,
    pub lists_models: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_all_providers() {
        let registry = ProviderRegistry::default();
        assert_eq!(registry.kinds(), AIProvider::all().to_vec());
        for kind in AIProvider::all() {
            assert_eq!(registry.get(*kind).unwrap().kind(), *kind);
        }
    }

    #[test]
    fn test_empty_registry_reports_unsupported() {
        let registry = ProviderRegistry::empty();
        let err = registry.require(AIProvider::Gemini).err().unwrap();
        assert_eq!(err.to_string(), "不支持的AI提供商: gemini");
    }

    #[test]
    fn test_metadata() {
        let metadata = ProviderRegistry::default().metadata();
        let custom = metadata.iter().find(|m| m.id == "custom").unwrap();
        assert!(!custom.lists_models);
        assert!(custom.default_base_url.is_none());

        let claude = metadata.iter().find(|m| m.id == "claude").unwrap();
        assert_eq!(claude.name, "Claude");
        assert!(claude.lists_models);
    }
}
