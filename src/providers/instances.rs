use crate::providers::types::{LlmRequest, LlmResponse, ProviderType};
use crate::errors::{CtfError, CtfResult};
use crate::constants;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

/// Common interface for every chat-completion backend
///
/// The provider manager hands out services behind this trait, so callers
/// never depend on which backend won the fallback walk.
#[async_trait]
pub trait ChatCompletion {
    /// Generate a completion
    async fn generate(&self, request: &LlmRequest) -> CtfResult<LlmResponse>;
    /// Registry name of the backend serving this handle
    fn provider_name(&self) -> &str;
    /// Model used when the request does not name one
    fn model(&self) -> &str;
}

/// Shared handle to a built chat-completion service
pub type ChatService = Arc<dyn ChatCompletion + Send + Sync>;

/// State shared by all backend clients
///
/// Holds the HTTP client (with timeout), the API key, the default model and
/// the resolved endpoint.
pub struct BaseClient {
    name: String,
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl BaseClient {
    /// Create a new BaseClient
    ///
    /// # Parameters
    /// * `name` - registry name of the backend
    /// * `api_key` - API key for authentication, may be empty
    /// * `model` - default model identifier
    /// * `endpoint` - fully resolved request URL
    pub fn new(name: &str, api_key: String, model: String, endpoint: String) -> CtfResult<Self> {
        let client = Client::builder()
            .timeout(constants::PROVIDER_HTTP_TIMEOUT)
            .build()
            .map_err(|e| CtfError::build(name, format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { name: name.to_string(), client, api_key, model, endpoint })
    }

    /// Get the HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the default model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the backend name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the request URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model for a request: the request's own or the configured default
    pub fn model_for(&self, request: &LlmRequest) -> String {
        request.model.clone().unwrap_or_else(|| self.model.clone())
    }
}

/// Picks the override endpoint if one is set, otherwise the default, and
/// checks that it parses as a URL.
pub(crate) fn resolve_endpoint(provider: &str, base_url: Option<&str>, default: &str) -> CtfResult<String> {
    let endpoint = match base_url {
        Some(url) if !url.trim().is_empty() => url.trim(),
        _ => default,
    };
    url::Url::parse(endpoint)
        .map_err(|e| CtfError::build(provider, format!("invalid endpoint '{}': {}", endpoint, e)))?;
    Ok(endpoint.to_string())
}

/// Backends whose type requires a key refuse to build without one
pub(crate) fn require_api_key(provider: ProviderType, api_key: &str) -> CtfResult<()> {
    if provider.requires_api_key() && api_key.trim().is_empty() {
        return Err(CtfError::build(provider.as_str(), "API key is not set"));
    }
    Ok(())
}
