/// Chat-completion backends and the builder registry
///
/// This module contains clients for:
/// - Anthropic (Claude models)
/// - OpenAI (GPT models)
/// - Ollama (local models, the keyless fallback)
///
/// Each client implements [`ChatCompletion`], and each has a builder in the
/// default [`BuilderRegistry`] keyed by its provider name.

pub mod anthropic;
pub mod openai;
pub mod ollama;
pub mod types;
pub mod instances;
pub mod registry;

pub use types::{ProviderType, LlmRequest, LlmResponse, Message, TokenUsage};
pub use instances::{ChatCompletion, ChatService, BaseClient};
pub use registry::{BuilderRegistry, ServiceBuilder};
pub use anthropic::AnthropicChat;
pub use openai::OpenAIChat;
pub use ollama::OllamaChat;
