//! Provider fallback: turns the ordered provider list into a working service.

use log::{debug, info, warn};

use crate::config::{get_settings, ProviderDescriptor, Settings};
use crate::constants;
use crate::errors::{CtfError, CtfResult};
use crate::kernel::Kernel;
use crate::providers::{BuilderRegistry, ChatService};

/// Builds chat services from the highest-precedence provider that works
///
/// Providers are tried strictly in priority order, one at a time. The first
/// one whose builder succeeds wins and no later provider is attempted.
pub struct ProviderManager {
    providers: Vec<ProviderDescriptor>,
    registry: BuilderRegistry,
}

impl ProviderManager {
    /// Creates a manager from the process-wide settings
    pub fn new() -> CtfResult<Self> {
        Self::from_settings(get_settings()?)
    }

    /// Creates a manager from an explicit settings snapshot
    pub fn from_settings(settings: &Settings) -> CtfResult<Self> {
        if !settings.has_hosted_provider() {
            warn!(
                "No hosted LLM provider key set (ANTHROPIC_API_KEY, OPENAI_API_KEY), only the local {} backend is available",
                constants::OLLAMA_PROVIDER
            );
        }
        Self::with_registry(settings.get_available_providers(), BuilderRegistry::default())
    }

    /// Creates a manager over an explicit provider list and builder table
    ///
    /// The list is sorted by priority (stable, so ties keep their order).
    ///
    /// # Errors
    /// * `ConfigError` if `providers` is empty. Lists derived from
    ///   [`Settings`] always contain the local fallback, so this only fires
    ///   for hand-built lists.
    pub fn with_registry(mut providers: Vec<ProviderDescriptor>, registry: BuilderRegistry) -> CtfResult<Self> {
        if providers.is_empty() {
            return Err(CtfError::ConfigError(
                "No LLM providers configured. Set at least ANTHROPIC_API_KEY or OPENAI_API_KEY".to_string(),
            ));
        }
        providers.sort_by_key(|p| p.priority);

        debug!(
            "Provider order: {}",
            providers.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(" -> ")
        );
        Ok(Self { providers, registry })
    }

    /// Highest-precedence provider, whether or not it would build
    pub fn primary_provider(&self) -> &ProviderDescriptor {
        &self.providers[0]
    }

    /// All candidate providers in the order they are tried
    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    /// Builds the chat service of the first provider that initializes.
    ///
    /// # Errors
    /// * `ProvidersExhausted` carrying the most recent builder error when
    ///   every provider failed or had no builder
    pub fn build_service(&self) -> CtfResult<ChatService> {
        self.first_available().map(|(_, service)| service)
    }

    /// Builds a fresh kernel holding the first provider that initializes,
    /// registered under `service_id`.
    ///
    /// Fails exactly like [`ProviderManager::build_service`].
    pub fn build_kernel(&self, service_id: &str) -> CtfResult<Kernel> {
        let mut kernel = Kernel::new();
        let (descriptor, service) = self.first_available()?;
        kernel.add_service(service_id, service);
        info!(
            "Kernel ready, provider={} model={} service_id={}",
            descriptor.name, descriptor.model, service_id
        );
        Ok(kernel)
    }

    /// [`ProviderManager::build_kernel`] with the default service id
    pub fn build_default_kernel(&self) -> CtfResult<Kernel> {
        self.build_kernel(constants::DEFAULT_SERVICE_ID)
    }

    fn first_available(&self) -> CtfResult<(&ProviderDescriptor, ChatService)> {
        let mut last_error: Option<CtfError> = None;

        for descriptor in &self.providers {
            // Unknown names are config skew, not a hard failure
            let Some(builder) = self.registry.get(&descriptor.name) else {
                warn!("Unknown provider '{}', skipping", descriptor.name);
                continue;
            };

            match builder(descriptor) {
                Ok(service) => {
                    debug!("Provider '{}' initialized", descriptor.name);
                    return Ok((descriptor, service));
                }
                Err(e) => {
                    warn!("Failed to init provider '{}': {}, trying next", descriptor.name, e);
                    last_error = Some(e);
                }
            }
        }

        Err(CtfError::ProvidersExhausted {
            last_error: last_error.map(Box::new),
        })
    }
}
