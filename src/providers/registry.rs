//! Name to builder table used by the provider manager.

use std::sync::Arc;

use crate::config::ProviderDescriptor;
use crate::errors::CtfResult;
use crate::providers::anthropic::AnthropicChat;
use crate::providers::instances::ChatService;
use crate::providers::ollama::OllamaChat;
use crate::providers::openai::OpenAIChat;
use crate::providers::types::ProviderType;

/// Constructs a chat service from a descriptor.
///
/// Builders only read the descriptor; they never retry and never touch the
/// manager's provider list.
pub type ServiceBuilder = fn(&ProviderDescriptor) -> CtfResult<ChatService>;

/// Registration table mapping provider names to builders
#[derive(Clone)]
pub struct BuilderRegistry {
    entries: Vec<(String, ServiceBuilder)>,
}

impl BuilderRegistry {
    /// A table with no builders
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registers `builder` under `name`, replacing any previous entry
    pub fn register(mut self, name: impl Into<String>, builder: ServiceBuilder) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = builder,
            None => self.entries.push((name, builder)),
        }
        self
    }

    /// Finds the builder registered under `name`
    pub fn get(&self, name: &str) -> Option<ServiceBuilder> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, builder)| *builder)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Default for BuilderRegistry {
    /// The built-in backends: Anthropic, OpenAI and Ollama
    fn default() -> Self {
        Self::empty()
            .register(ProviderType::Anthropic.as_str(), build_anthropic_service)
            .register(ProviderType::OpenAI.as_str(), build_openai_service)
            .register(ProviderType::Ollama.as_str(), build_ollama_service)
    }
}

pub fn build_anthropic_service(descriptor: &ProviderDescriptor) -> CtfResult<ChatService> {
    Ok(Arc::new(AnthropicChat::new(descriptor)?))
}

pub fn build_openai_service(descriptor: &ProviderDescriptor) -> CtfResult<ChatService> {
    Ok(Arc::new(OpenAIChat::new(descriptor)?))
}

pub fn build_ollama_service(descriptor: &ProviderDescriptor) -> CtfResult<ChatService> {
    Ok(Arc::new(OllamaChat::new(descriptor)?))
}
