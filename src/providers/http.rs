//! Shared outbound HTTP plumbing for the adapters
//!
//! One send path for every vendor: logs the sanitized URL, turns non-2xx
//! responses into `ProviderError::Upstream` with the vendor's own message,
//! and decodes successful bodies into the adapter's typed envelope.

use std::collections::BTreeSet;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::base::{AIProvider, ProviderError};
use crate::security::Sanitizer;

/// Resolves the base URL for a provider, preferring the caller's override
pub(crate) fn base_url(provider: AIProvider, endpoint: Option<&str>) -> Result<String, ProviderError> {
    endpoint
        .filter(|e| !e.trim().is_empty())
        .or(provider.default_base_url())
        .map(|base| base.trim().trim_end_matches('/').to_string())
        .ok_or(ProviderError::MissingEndpoint)
}

/// Joins a base URL and a path with exactly one slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Sends a request and decodes a successful JSON body into `T`
pub(crate) async fn send_json<T: DeserializeOwned>(
    client: &Client,
    provider: AIProvider,
    builder: RequestBuilder,
) -> Result<T, ProviderError> {
    let request = builder
        .build()
        .map_err(|source| ProviderError::Network { provider, source })?;

    tracing::debug!(
        provider = provider.as_str(),
        method = %request.method(),
        url = %Sanitizer::sanitize_url(request.url().as_str()),
        "Sending request"
    );

    let response = client
        .execute(request)
        .await
        .map_err(|source| ProviderError::Network { provider, source })?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|source| ProviderError::Network { provider, source })?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        tracing::warn!(
            provider = provider.as_str(),
            status = status.as_u16(),
            body = %Sanitizer::truncate_body(&text, 500),
            "Upstream request failed"
        );
        return Err(ProviderError::Upstream {
            provider,
            status,
            message: upstream_error_detail(status, &text),
        });
    }

    serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(provider = provider.as_str(), "Failed to decode response: {}", e);
        ProviderError::invalid_response(provider, e.to_string())
    })
}

/// Extracts the most specific message from an error body
///
/// Tries `error.message`, a plain string `error`, then `message`; falls back
/// to the status reason when the body is not JSON or carries none of them.
pub(crate) fn upstream_error_detail(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .or_else(|| v.get("error").and_then(Value::as_str))
                .or_else(|| v.get("message").and_then(Value::as_str))
        })
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string())
        })
}

/// One entry of a vendor's model list
#[derive(Debug, Deserialize)]
pub(crate) struct ModelEntry {
    id: Option<String>,
    name: Option<String>,
}

impl ModelEntry {
    fn identifier(self) -> Option<String> {
        self.id.or(self.name).filter(|id| !id.trim().is_empty())
    }
}

/// The list shapes vendors answer `/models` with
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ModelListEnvelope {
    Data { data: Vec<ModelEntry> },
    Models { models: Vec<ModelEntry> },
    Bare(Vec<ModelEntry>),
}

impl ModelListEnvelope {
    /// Yields `id`, else `name`, for each entry that has one
    pub(crate) fn identifiers(self) -> impl Iterator<Item = String> {
        let entries = match self {
            Self::Data { data } => data,
            Self::Models { models } => models,
            Self::Bare(entries) => entries,
        };
        entries.into_iter().filter_map(ModelEntry::identifier)
    }
}

/// Deduplicates and sorts model identifiers
pub(crate) fn normalize_model_ids<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}
