//! Per-user bring-your-own-key configuration
//!
//! A user record holds the provider tag, model, endpoint, display label and
//! the API key as ciphertext. Reading decrypts; writing encrypts. A record
//! without a provider or key means "not configured", not an error.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::providers::{AIConfig, AIProvider};
use crate::security::{KeyCipher, Sanitizer};

use super::ConfigError;

/// The AI fields of a persisted user record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAiSettings {
    pub ai_provider: Option<String>,
    pub ai_model: Option<String>,
    /// Ciphertext produced by `KeyCipher::encrypt`
    pub ai_api_key: Option<String>,
    pub ai_api_endpoint: Option<String>,
    pub ai_custom_provider_name: Option<String>,
}

/// Storage for user AI settings; the schema is owned by the host application
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserSettingsStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<UserAiSettings>, ConfigError>;

    async fn save(&self, user_id: &str, settings: UserAiSettings) -> Result<(), ConfigError>;
}

/// Process-local store, for the CLI and tests
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: RwLock<HashMap<String, UserAiSettings>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserSettingsStore for InMemoryUserStore {
    async fn load(&self, user_id: &str) -> Result<Option<UserAiSettings>, ConfigError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, settings: UserAiSettings) -> Result<(), ConfigError> {
        self.records.write().await.insert(user_id.to_string(), settings);
        Ok(())
    }
}

/// Builds `AIConfig`s from stored user settings
#[derive(Clone)]
pub struct UserConfigResolver {
    store: Arc<dyn UserSettingsStore>,
    cipher: KeyCipher,
}

impl UserConfigResolver {
    pub fn new(store: Arc<dyn UserSettingsStore>, cipher: KeyCipher) -> Self {
        Self { store, cipher }
    }

    /// Uses `ENCRYPTION_KEY` from the environment
    pub fn from_env(store: Arc<dyn UserSettingsStore>) -> Result<Self, ConfigError> {
        Ok(Self::new(store, KeyCipher::from_env()?))
    }

    /// Loads and decrypts the user's config
    ///
    /// Returns `Ok(None)` when the user has no record, no provider or no key.
    pub async fn resolve(&self, user_id: &str) -> Result<Option<AIConfig>, ConfigError> {
        let Some(settings) = self.store.load(user_id).await? else {
            tracing::warn!(user_id, "No AI settings stored for user");
            return Ok(None);
        };

        let provider_tag = non_blank(settings.ai_provider);
        let encrypted_key = non_blank(settings.ai_api_key);
        let (Some(provider_tag), Some(encrypted_key)) = (provider_tag, encrypted_key) else {
            tracing::warn!(user_id, "User AI provider or key not configured");
            return Ok(None);
        };

        let provider = provider_tag
            .parse::<AIProvider>()
            .map_err(|_| ConfigError::UnsupportedProvider(provider_tag.clone()))?;
        let api_key = self.cipher.decrypt(&encrypted_key)?;

        tracing::debug!(
            user_id,
            provider = provider.as_str(),
            key = %Sanitizer::sanitize_token(&api_key),
            "Resolved user AI config"
        );

        Ok(Some(AIConfig {
            provider,
            model: settings.ai_model.unwrap_or_default(),
            api_key,
            api_endpoint: non_blank(settings.ai_api_endpoint),
            custom_provider_name: non_blank(settings.ai_custom_provider_name),
        }))
    }

    /// Encrypts the key and persists the config as the user's settings
    pub async fn save_settings(&self, user_id: &str, config: &AIConfig) -> Result<(), ConfigError> {
        let settings = UserAiSettings {
            ai_provider: Some(config.provider.as_str().to_string()),
            ai_model: Some(config.model.clone()),
            ai_api_key: Some(self.cipher.encrypt(&config.api_key)?),
            ai_api_endpoint: non_blank(config.api_endpoint.clone()),
            ai_custom_provider_name: non_blank(config.custom_provider_name.clone()),
        };

        self.store.save(user_id, settings).await?;
        tracing::info!(user_id, provider = config.provider.as_str(), "Saved user AI settings");
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
