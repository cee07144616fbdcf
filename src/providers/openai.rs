use crate::config::ProviderDescriptor;
use crate::providers::instances::{self, ChatCompletion, BaseClient};
use crate::providers::types::{LlmRequest, LlmResponse, ProviderType, TokenUsage, Message};
use crate::errors::{CtfError, CtfResult};
use crate::constants;

use async_trait::async_trait;
use log::info;
use reqwest::header;
use serde::{Serialize, Deserialize};

/// Chat service backed by OpenAI's chat completion API (GPT models)
pub struct OpenAIChat {
    base: BaseClient,
    headers: header::HeaderMap,
}

/// Request body for OpenAI's chat completion API
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    model: String,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

/// Assistant message in a reply; `content` is null for tool-call or refusal turns
#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAIChat {
    /// Builds the client from a descriptor
    ///
    /// # Parameters
    /// * `descriptor` - must carry an API key; `base_url`, when set, replaces
    ///   the chat completions URL (for OpenAI-compatible gateways)
    pub fn new(descriptor: &ProviderDescriptor) -> CtfResult<Self> {
        let name = constants::OPENAI_PROVIDER;
        instances::require_api_key(ProviderType::OpenAI, &descriptor.api_key)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", descriptor.api_key))
                .map_err(|e| CtfError::build(name, format!("invalid API key format: {}", e)))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let endpoint = instances::resolve_endpoint(
            name,
            descriptor.base_url.as_deref(),
            constants::OPENAI_API_ENDPOINT,
        )?;
        let base = BaseClient::new(name, descriptor.api_key.clone(), descriptor.model.clone(), endpoint)?;

        info!("Using OpenAI provider, model={}", descriptor.model);
        Ok(Self { base, headers })
    }
}

#[async_trait]
impl ChatCompletion for OpenAIChat {
    async fn generate(&self, request: &LlmRequest) -> CtfResult<LlmResponse> {
        let openai_request = OpenAIRequest {
            model: self.base.model_for(request),
            messages: request.messages.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(self.headers.clone())
            .json(&openai_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CtfError::from_api_response("OpenAI", status, error_text));
        }

        let openai_response: OpenAIResponse = response.json().await?;

        let usage = openai_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let content = openai_response.choices.into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CtfError::ApiError("No response from OpenAI".to_string()))?;

        Ok(LlmResponse {
            content,
            model: openai_response.model,
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
