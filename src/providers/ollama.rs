use crate::config::ProviderDescriptor;
use crate::providers::instances::{self, ChatCompletion, BaseClient};
use crate::providers::types::{LlmRequest, LlmResponse, ProviderType, TokenUsage, Message};
use crate::errors::{CtfError, CtfResult};
use crate::constants;
use async_trait::async_trait;
use log::info;
use reqwest::header;
use serde::{Serialize, Deserialize};
use url::Url;

/// Chat service backed by a local or self-hosted Ollama server
pub struct OllamaChat {
    base: BaseClient,
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize, Default)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>, // max_tokens
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    model: String,
    message: Message,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

impl OllamaChat {
    /// Builds the client from a descriptor.
    ///
    /// No API key is needed; one is sent as a bearer token if present (for
    /// servers behind an authenticating proxy). `base_url` is the server root
    /// and `/api/chat` is appended unless already there.
    pub fn new(descriptor: &ProviderDescriptor) -> CtfResult<Self> {
        let name = constants::OLLAMA_PROVIDER;
        instances::require_api_key(ProviderType::Ollama, &descriptor.api_key)?;

        let base_url = match descriptor.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim(),
            _ => constants::DEFAULT_OLLAMA_BASE_URL,
        };
        let endpoint = chat_endpoint(base_url)
            .map_err(|e| CtfError::build(name, format!("invalid base URL '{}': {}", base_url, e)))?;

        let base = BaseClient::new(name, descriptor.api_key.clone(), descriptor.model.clone(), endpoint)?;

        info!("Using Ollama provider, model={} base_url={}", descriptor.model, base_url);
        Ok(Self { base })
    }
}

/// Appends the chat path to an Ollama server root
fn chat_endpoint(base_url: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with(constants::OLLAMA_CHAT_PATH) {
        let current_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", current_path, constants::OLLAMA_CHAT_PATH));
    }
    Ok(url.to_string())
}

#[async_trait]
impl ChatCompletion for OllamaChat {
    async fn generate(&self, request: &LlmRequest) -> CtfResult<LlmResponse> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if !self.base.api_key().is_empty() {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", self.base.api_key()))
                .map_err(|e| CtfError::ConfigError(format!("Invalid API key format for Ollama: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let options = OllamaOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        };
        let has_options = options.temperature.is_some() || options.num_predict.is_some();

        let ollama_request = OllamaRequest {
            model: self.base.model_for(request),
            messages: request.messages.clone(),
            stream: false,
            options: if has_options { Some(options) } else { None },
        };

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(headers)
            .json(&ollama_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CtfError::from_api_response("Ollama", status, error_text));
        }

        let response_text = response.text().await?;
        if response_text.is_empty() {
            return Err(CtfError::ApiError("Received empty response body from Ollama".to_string()));
        }

        let ollama_response: OllamaResponse = serde_json::from_str(&response_text)
            .map_err(|e| CtfError::ParseError(format!("Failed to parse Ollama response: {}. Body: {}", e, response_text)))?;

        let usage = Some(TokenUsage {
            prompt_tokens: ollama_response.prompt_eval_count,
            completion_tokens: ollama_response.eval_count,
            total_tokens: ollama_response.prompt_eval_count.saturating_add(ollama_response.eval_count),
        });

        Ok(LlmResponse {
            content: ollama_response.message.content,
            model: ollama_response.model,
            usage,
        })
    }

    fn provider_name(&self) -> &str {
        self.base.name()
    }

    fn model(&self) -> &str {
        self.base.model()
    }
}
