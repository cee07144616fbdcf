use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::constants;
use crate::errors::CtfError;

/// Backends with a builder in the default registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Anthropic,
    OpenAI,
    Ollama,
}

impl ProviderType {
    /// Registry key for this backend
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Anthropic => constants::ANTHROPIC_PROVIDER,
            ProviderType::OpenAI => constants::OPENAI_PROVIDER,
            ProviderType::Ollama => constants::OLLAMA_PROVIDER,
        }
    }

    /// Hosted backends need an API key; the local backend does not
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderType::Ollama)
    }
}

impl FromStr for ProviderType {
    type Err = CtfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            constants::ANTHROPIC_PROVIDER => Ok(ProviderType::Anthropic),
            constants::OPENAI_PROVIDER => Ok(ProviderType::OpenAI),
            constants::OLLAMA_PROVIDER => Ok(ProviderType::Ollama),
            other => Err(CtfError::ConfigError(format!("Unknown provider type '{}'", other))),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::Anthropic => write!(f, "Anthropic"),
            ProviderType::OpenAI => write!(f, "OpenAI"),
            ProviderType::Ollama => write!(f, "Ollama"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// A single-turn request carrying one user message
    pub fn user(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
