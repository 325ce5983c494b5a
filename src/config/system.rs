//! Shared platform credentials
//!
//! Credits and subscription calls are funded by one process-wide credential
//! read from `COMMON_AI_*`. Both modes currently resolve to the same values;
//! the model is left empty and supplied by the end user at call time.

use crate::providers::{AIConfig, AIProvider};
use crate::security::{Sanitizer, SecureString};

use super::AIConfigMode;

pub const COMMON_AI_PROVIDER_VAR: &str = "COMMON_AI_PROVIDER";
pub const COMMON_AI_API_KEY_VAR: &str = "COMMON_AI_API_KEY";
pub const COMMON_AI_API_ENDPOINT_VAR: &str = "COMMON_AI_API_ENDPOINT";

/// The provider/key/endpoint triple behind the shared configs
#[derive(Debug, Clone, PartialEq)]
pub struct SharedCredentials {
    pub provider: AIProvider,
    pub api_key: SecureString,
    pub api_endpoint: Option<String>,
}

impl SharedCredentials {
    /// Reads the process environment
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads through an arbitrary variable lookup
    ///
    /// Blank values count as unset. Missing or invalid values are logged and
    /// yield `None` so callers can fall back to an "AI unavailable" state.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let Some(tag) = read(COMMON_AI_PROVIDER_VAR) else {
            tracing::warn!("{} is not set, shared AI config unavailable", COMMON_AI_PROVIDER_VAR);
            return None;
        };

        let provider = match tag.parse::<AIProvider>() {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!("{} is invalid: {}", COMMON_AI_PROVIDER_VAR, e);
                return None;
            }
        };

        let Some(api_key) = read(COMMON_AI_API_KEY_VAR) else {
            tracing::warn!("{} is not set, shared AI config unavailable", COMMON_AI_API_KEY_VAR);
            return None;
        };

        let api_endpoint = read(COMMON_AI_API_ENDPOINT_VAR);

        tracing::debug!(
            provider = provider.as_str(),
            key = %Sanitizer::sanitize_token(&api_key),
            endpoint = api_endpoint.as_deref().unwrap_or("default"),
            "Loaded shared AI credentials"
        );

        Some(Self {
            provider,
            api_key: SecureString::new(api_key),
            api_endpoint,
        })
    }

    /// Builds a call config with an empty model
    pub fn to_config(&self) -> AIConfig {
        AIConfig {
            provider: self.provider,
            model: String::new(),
            api_key: self.api_key.clone(),
            api_endpoint: self.api_endpoint.clone(),
            custom_provider_name: None,
        }
    }
}

/// Resolves the shared config for `mode`, reading the environment now
///
/// `custom` never yields a shared config: it always means the user's own key.
pub fn get_system_config(mode: AIConfigMode) -> Option<AIConfig> {
    if !mode.uses_shared_credentials() {
        return None;
    }
    SharedCredentials::from_env().map(|credentials| credentials.to_config())
}

/// Shared config for credit-metered calls
pub fn get_credits_system_config() -> Option<AIConfig> {
    get_system_config(AIConfigMode::Credits)
}

/// Shared config for subscription-included calls
pub fn get_subscription_system_config() -> Option<AIConfig> {
    get_system_config(AIConfigMode::Subscription)
}

/// Immutable snapshot of the shared credentials, taken once at startup
#[derive(Debug, Clone, Default)]
pub struct SystemConfig {
    shared: Option<SharedCredentials>,
}

impl SystemConfig {
    pub fn load() -> Self {
        Self::from_credentials(SharedCredentials::from_env())
    }

    pub fn from_credentials(shared: Option<SharedCredentials>) -> Self {
        Self { shared }
    }

    pub fn is_configured(&self) -> bool {
        self.shared.is_some()
    }

    pub fn config_for(&self, mode: AIConfigMode) -> Option<AIConfig> {
        if !mode.uses_shared_credentials() {
            return None;
        }
        self.shared.as_ref().map(SharedCredentials::to_config)
    }

    pub fn credits(&self) -> Option<AIConfig> {
        self.config_for(AIConfigMode::Credits)
    }

    pub fn subscription(&self) -> Option<AIConfig> {
        self.config_for(AIConfigMode::Subscription)
    }
}
