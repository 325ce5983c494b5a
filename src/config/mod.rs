//! Configuration resolution
//!
//! Two independent paths produce an `AIConfig`: the user's own encrypted key
//! (`user`) or the shared platform credential (`system`). `AIConfigMode`
//! selects between them; `custom` always means the user path.

pub mod system;
pub mod user;

pub use system::{
    get_credits_system_config, get_subscription_system_config, get_system_config, SharedCredentials,
    SystemConfig, COMMON_AI_API_ENDPOINT_VAR, COMMON_AI_API_KEY_VAR, COMMON_AI_PROVIDER_VAR,
};
pub use user::{InMemoryUserStore, UserAiSettings, UserConfigResolver, UserSettingsStore};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::AIConfig;
use crate::security::CipherError;

/// Which credential pool funds a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIConfigMode {
    Credits,
    Subscription,
    Custom,
}

impl AIConfigMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credits => "credits",
            Self::Subscription => "subscription",
            Self::Custom => "custom",
        }
    }

    /// True for the modes served by the shared platform credential
    pub fn uses_shared_credentials(&self) -> bool {
        !matches!(self, Self::Custom)
    }
}

impl fmt::Display for AIConfigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AIConfigMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "credits" => Ok(Self::Credits),
            "subscription" => Ok(Self::Subscription),
            "custom" => Ok(Self::Custom),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Errors raised while resolving or persisting configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backing user store failed
    #[error("User settings store error: {0}")]
    Store(String),

    /// Encrypting or decrypting the stored API key failed
    #[error("Stored API key error: {0}")]
    Cipher(#[from] CipherError),

    /// The stored provider tag is not one we can dispatch to
    #[error("不支持的AI提供商: {0}")]
    UnsupportedProvider(String),

    #[error("Unknown AI config mode: {0}")]
    UnknownMode(String),
}

/// Routes a mode to the user or shared resolution path
#[derive(Clone)]
pub struct ConfigResolver {
    user: UserConfigResolver,
    /// Snapshot of the shared credentials; `None` reads the environment per call
    system: Option<SystemConfig>,
}

impl ConfigResolver {
    pub fn new(user: UserConfigResolver) -> Self {
        Self { user, system: None }
    }

    /// Serves shared modes from a startup snapshot instead of the live environment
    pub fn with_system_config(mut self, system: SystemConfig) -> Self {
        self.system = Some(system);
        self
    }

    pub fn user(&self) -> &UserConfigResolver {
        &self.user
    }

    /// Resolves the config for a call
    ///
    /// `Ok(None)` means AI is unavailable for this user and mode.
    pub async fn resolve(&self, mode: AIConfigMode, user_id: &str) -> Result<Option<AIConfig>, ConfigError> {
        if !mode.uses_shared_credentials() {
            return self.user.resolve(user_id).await;
        }

        let config = match &self.system {
            Some(system) => system.config_for(mode),
            None => get_system_config(mode),
        };
        if config.is_none() {
            tracing::warn!(mode = mode.as_str(), "Shared AI config unavailable");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::AIProvider;
    use crate::security::KeyCipher;
    use std::sync::Arc;

    fn snapshot() -> SystemConfig {
        SystemConfig::from_credentials(SharedCredentials::from_lookup(|name| match name {
            COMMON_AI_PROVIDER_VAR => Some("gemini".to_string()),
            COMMON_AI_API_KEY_VAR => Some("AIza-shared".to_string()),
            _ => None,
        }))
    }

    async fn resolver() -> ConfigResolver {
        let user = UserConfigResolver::new(
            Arc::new(InMemoryUserStore::new()),
            KeyCipher::new("mode-routing-secret").unwrap(),
        );
        user.save_settings("alice", &AIConfig::new(AIProvider::OpenAI, "gpt-4o-mini", "sk-alice"))
            .await
            .unwrap();
        ConfigResolver::new(user).with_system_config(snapshot())
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("credits".parse::<AIConfigMode>().unwrap(), AIConfigMode::Credits);
        assert_eq!("subscription".parse::<AIConfigMode>().unwrap(), AIConfigMode::Subscription);
        assert_eq!("custom".parse::<AIConfigMode>().unwrap(), AIConfigMode::Custom);
        assert!(matches!(
            "free".parse::<AIConfigMode>(),
            Err(ConfigError::UnknownMode(ref m)) if m == "free"
        ));
        assert_eq!(serde_json::to_string(&AIConfigMode::Subscription).unwrap(), "\"subscription\"");
    }

    #[tokio::test]
    async fn test_custom_mode_uses_user_key() {
        let config = resolver()
            .await
            .resolve(AIConfigMode::Custom, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(config.provider, AIProvider::OpenAI);
        assert_eq!(config.api_key, "sk-alice");
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_shared_modes_ignore_user() {
        let resolver = resolver().await;
        for mode in [AIConfigMode::Credits, AIConfigMode::Subscription] {
            let config = resolver.resolve(mode, "alice").await.unwrap().unwrap();
            assert_eq!(config.provider, AIProvider::Gemini);
            assert_eq!(config.api_key, "AIza-shared");
            assert!(config.model.is_empty());

            let config = config.with_model("gemini-1.5-flash");
            assert_eq!(config.model, "gemini-1.5-flash");
        }
    }

    #[tokio::test]
    async fn test_unconfigured_shared_mode_is_none() {
        let resolver = resolver()
            .await
            .with_system_config(SystemConfig::from_credentials(None));
        assert!(resolver.resolve(AIConfigMode::Credits, "alice").await.unwrap().is_none());
    }
}
