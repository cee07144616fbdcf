use crate::config::ProviderDescriptor;
use crate::providers::instances::{self, ChatCompletion, BaseClient};
use crate::providers::types::{LlmRequest, LlmResponse, ProviderType, TokenUsage};
use crate::errors::{CtfError, CtfResult};
use crate::constants;

use async_trait::async_trait;
use log::info;
use reqwest::header;
use serde::{Serialize, Deserialize};

/// Chat service backed by Anthropic's Messages API (Claude models)
pub struct AnthropicChat {
    base: BaseClient,
    headers: header::HeaderMap,
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    model: String,
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
    #[serde(rename = "type")]
    content_type: String,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicChat {
    /// Builds the client from a descriptor.
    ///
    /// Fails when the API key is missing or cannot be sent as a header, or
    /// when the endpoint override is not a valid URL.
    pub fn new(descriptor: &ProviderDescriptor) -> CtfResult<Self> {
        let name = constants::ANTHROPIC_PROVIDER;
        instances::require_api_key(ProviderType::Anthropic, &descriptor.api_key)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(&descriptor.api_key)
                .map_err(|e| CtfError::build(name, format!("invalid API key format: {}", e)))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(constants::ANTHROPIC_API_VERSION),
        );

        let endpoint = instances::resolve_endpoint(
            name,
            descriptor.base_url.as_deref(),
            constants::ANTHROPIC_API_ENDPOINT,
        )?;
        let base = BaseClient::new(name, descriptor.api_key.clone(), descriptor.model.clone(), endpoint)?;

        info!("Using Anthropic provider, model={}", descriptor.model);
        Ok(Self { base, headers })
    }
}

#[async_trait]
impl ChatCompletion for AnthropicChat {
    async fn generate(&self, request: &LlmRequest) -> CtfResult<LlmResponse> {
        let model = self.base.model_for(request);

        // Anthropic takes the system prompt out of band
        let mut system_content = None;
        let mut regular_messages = Vec::new();

        for msg in &request.messages {
            if msg.role == "system" {
                system_content = Some(msg.content.clone());
            } else {
                regular_messages.push(AnthropicMessage {
                    role: msg.role.clone(),
                    content: msg.content.clone(),
                });
            }
        }

        if regular_messages.is_empty() {
            match system_content.take() {
                Some(system) => regular_messages.push(AnthropicMessage {
                    role: "user".to_string(),
                    content: format!("Using this context: {}", system),
                }),
                None => {
                    return Err(CtfError::ApiError("Anthropic requires at least one message".to_string()));
                }
            }
        }

        let anthropic_request = AnthropicRequest {
            model,
            system: system_content,
            messages: regular_messages,
            max_tokens: request.max_tokens.unwrap_or(constants::DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
        };

        let response = self.base.client()
            .post(self.base.endpoint())
            .headers(self.headers.clone())
            .json(&anthropic_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CtfError::from_api_response("Anthropic", status, error_text));
        }

        let anthropic_response: AnthropicResponse = response.json().await?;

        if anthropic_response.content.is_empty() {
            return Err(CtfError::ApiError("No response from Anthropic".to_string()));
        }

        let usage = anthropic_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens.saturating_add(u.output_tokens),
        });

        let text = anthropic_response.content.iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<&str>>()
            .join("");

        Ok(LlmResponse {
            content: text,
            model: anthropic_response.model,
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
