//! Settings snapshot and provider descriptor types.
//!
//! `Settings` mirrors the environment one field per variable. The ordered
//! provider list is derived from it on demand and never stored.

use std::fmt;
use std::time::Duration;

use regex::Regex;

use crate::constants;
use crate::errors::CtfResult;

/// Connection parameters and precedence for one LLM backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Backend name used to look up its builder ("anthropic", "openai", "ollama").
    pub name: String,
    /// API key; empty for keyless backends.
    pub api_key: String,
    /// Model identifier passed to the backend.
    pub model: String,
    /// Endpoint override.
    pub base_url: Option<String>,
    /// Lower values are tried first.
    pub priority: u32,
}

impl ProviderDescriptor {
    /// Creates a keyless descriptor with priority 0 and no endpoint override.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: String::new(),
            model: model.into(),
            base_url: None,
            priority: 0,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the endpoint override.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether an API key is present
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Process-wide configuration read from the environment.
///
/// Obtain the shared instance through [`crate::config::get_settings`]; build
/// private copies with [`Settings::from_env`] or [`Settings::from_lookup`].
#[derive(Clone)]
pub struct Settings {
    // LLM providers
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub ollama_base_url: String,
    pub ollama_model: String,

    // Team shared provider
    pub team_shared_provider: String,
    pub team_shared_api_key: String,
    pub team_shared_rate_limit: u32,

    // Agent endpoints
    pub orchestrator_host: String,
    pub orchestrator_port: u16,
    pub vuln_agent_host: String,
    pub vuln_agent_port: u16,

    // CTF environment
    pub vm_ip: String,
    pub flag_regex: String,
    pub tick_duration_secs: u64,

    // Vulnbox SSH
    pub vulnbox_ssh_host: String,
    pub vulnbox_ssh_port: u16,
    pub vulnbox_ssh_user: String,
    pub vulnbox_ssh_key_path: String,

    // Cache / queue
    pub redis_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            anthropic_model: constants::DEFAULT_ANTHROPIC_MODEL.to_string(),
            openai_api_key: String::new(),
            openai_model: constants::DEFAULT_OPENAI_MODEL.to_string(),
            ollama_base_url: constants::DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: constants::DEFAULT_OLLAMA_MODEL.to_string(),
            team_shared_provider: constants::DEFAULT_TEAM_SHARED_PROVIDER.to_string(),
            team_shared_api_key: String::new(),
            team_shared_rate_limit: constants::DEFAULT_TEAM_SHARED_RATE_LIMIT,
            orchestrator_host: constants::DEFAULT_AGENT_HOST.to_string(),
            orchestrator_port: constants::DEFAULT_ORCHESTRATOR_PORT,
            vuln_agent_host: constants::DEFAULT_AGENT_HOST.to_string(),
            vuln_agent_port: constants::DEFAULT_VULN_AGENT_PORT,
            vm_ip: constants::DEFAULT_VM_IP.to_string(),
            flag_regex: constants::DEFAULT_FLAG_REGEX.to_string(),
            tick_duration_secs: constants::DEFAULT_TICK_DURATION_SECS,
            vulnbox_ssh_host: constants::DEFAULT_VULNBOX_SSH_HOST.to_string(),
            vulnbox_ssh_port: constants::DEFAULT_VULNBOX_SSH_PORT,
            vulnbox_ssh_user: constants::DEFAULT_VULNBOX_SSH_USER.to_string(),
            vulnbox_ssh_key_path: constants::DEFAULT_VULNBOX_SSH_KEY_PATH.to_string(),
            redis_url: constants::DEFAULT_REDIS_URL.to_string(),
        }
    }
}

impl Settings {
    /// Returns the usable LLM providers, highest precedence first.
    ///
    /// Hosted backends are included only when their API key is set. The local
    /// Ollama backend needs no key and is always appended as the last resort,
    /// so the result is never empty.
    pub fn get_available_providers(&self) -> Vec<ProviderDescriptor> {
        let mut providers = Vec::with_capacity(3);

        if !self.anthropic_api_key.is_empty() {
            providers.push(
                ProviderDescriptor::new(constants::ANTHROPIC_PROVIDER, &self.anthropic_model)
                    .with_api_key(&self.anthropic_api_key)
                    .with_priority(constants::ANTHROPIC_PRIORITY),
            );
        }
        if !self.openai_api_key.is_empty() {
            providers.push(
                ProviderDescriptor::new(constants::OPENAI_PROVIDER, &self.openai_model)
                    .with_api_key(&self.openai_api_key)
                    .with_priority(constants::OPENAI_PRIORITY),
            );
        }

        providers.push(
            ProviderDescriptor::new(constants::OLLAMA_PROVIDER, &self.ollama_model)
                .with_base_url(&self.ollama_base_url)
                .with_priority(constants::OLLAMA_PRIORITY),
        );

        // sort_by_key is stable, equal priorities keep insertion order
        providers.sort_by_key(|p| p.priority);
        providers
    }

    /// Whether any hosted (keyed) provider is configured
    pub fn has_hosted_provider(&self) -> bool {
        !self.anthropic_api_key.is_empty() || !self.openai_api_key.is_empty()
    }

    /// The team-wide shared provider as a descriptor, if its key is set.
    ///
    /// Not part of [`Settings::get_available_providers`]; callers that share a
    /// rate-limited team key opt into it explicitly.
    pub fn team_shared_descriptor(&self) -> Option<ProviderDescriptor> {
        if self.team_shared_api_key.is_empty() {
            return None;
        }

        let name = self.team_shared_provider.to_lowercase();
        let model = match name.as_str() {
            constants::ANTHROPIC_PROVIDER => self.anthropic_model.clone(),
            constants::OPENAI_PROVIDER => self.openai_model.clone(),
            constants::OLLAMA_PROVIDER => self.ollama_model.clone(),
            _ => String::new(),
        };

        let mut descriptor = ProviderDescriptor::new(name, model)
            .with_api_key(&self.team_shared_api_key)
            .with_priority(constants::TEAM_SHARED_PRIORITY);
        if descriptor.name == constants::OLLAMA_PROVIDER {
            descriptor = descriptor.with_base_url(&self.ollama_base_url);
        }
        Some(descriptor)
    }

    /// Compiles the configured flag format
    pub fn flag_pattern(&self) -> CtfResult<Regex> {
        Ok(Regex::new(&self.flag_regex)?)
    }

    /// Returns every flag-shaped substring of `text`, in order of appearance
    pub fn find_flags(&self, text: &str) -> CtfResult<Vec<String>> {
        let pattern = self.flag_pattern()?;
        Ok(pattern.find_iter(text).map(|m| m.as_str().to_string()).collect())
    }

    /// Length of one game round
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(self.tick_duration_secs)
    }

    pub fn orchestrator_addr(&self) -> String {
        format!("{}:{}", self.orchestrator_host, self.orchestrator_port)
    }

    pub fn vuln_agent_addr(&self) -> String {
        format!("{}:{}", self.vuln_agent_host, self.vuln_agent_port)
    }

    /// `user@host` for the vulnbox SSH connection; the port is kept separate
    pub fn vulnbox_ssh_destination(&self) -> String {
        format!("{}@{}", self.vulnbox_ssh_user, self.vulnbox_ssh_host)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("anthropic_model", &self.anthropic_model)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_model", &self.openai_model)
            .field("ollama_base_url", &self.ollama_base_url)
            .field("ollama_model", &self.ollama_model)
            .field("team_shared_provider", &self.team_shared_provider)
            .field("team_shared_api_key", &redact(&self.team_shared_api_key))
            .field("team_shared_rate_limit", &self.team_shared_rate_limit)
            .field("orchestrator_host", &self.orchestrator_host)
            .field("orchestrator_port", &self.orchestrator_port)
            .field("vuln_agent_host", &self.vuln_agent_host)
            .field("vuln_agent_port", &self.vuln_agent_port)
            .field("vm_ip", &self.vm_ip)
            .field("flag_regex", &self.flag_regex)
            .field("tick_duration_secs", &self.tick_duration_secs)
            .field("vulnbox_ssh_host", &self.vulnbox_ssh_host)
            .field("vulnbox_ssh_port", &self.vulnbox_ssh_port)
            .field("vulnbox_ssh_user", &self.vulnbox_ssh_user)
            .field("vulnbox_ssh_key_path", &self.vulnbox_ssh_key_path)
            .field("redis_url", &self.redis_url)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
