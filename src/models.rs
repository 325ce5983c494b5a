//! Model listing
//!
//! Enumerates model identifiers for a settings dropdown. Runs independently of
//! the completion path; `custom` endpoints have nothing to enumerate.

use crate::gateway::default_gateway;
use crate::providers::{AIProvider, ModelListRequest, ProviderError, ProviderRegistry};

/// Lists models through the adapters in `registry`
pub async fn list_with_registry(
    registry: &ProviderRegistry,
    request: &ModelListRequest,
) -> Result<Vec<String>, ProviderError> {
    if request.provider == AIProvider::Custom {
        tracing::debug!("Custom provider has no model catalog");
        return Ok(Vec::new());
    }

    let provider = registry.require(request.provider)?;
    let models = provider.list_models(request).await?;

    tracing::info!(
        provider = request.provider.as_str(),
        count = models.len(),
        "Listed models"
    );
    Ok(models)
}

/// Stand-alone lister for callers that never issue completions
#[derive(Clone, Default)]
pub struct ModelLister {
    registry: ProviderRegistry,
}

impl ModelLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub async fn list(&self, request: &ModelListRequest) -> Result<Vec<String>, ProviderError> {
        list_with_registry(&self.registry, request).await
    }
}

/// Lists models through the process-wide default gateway
pub async fn list_ai_models(request: &ModelListRequest) -> Result<Vec<String>, ProviderError> {
    list_with_registry(default_gateway().registry(), request).await
}
