use std::collections::HashMap;

use crate::constants;
use crate::providers::ChatService;

/// Named container of chat services
///
/// Agents look services up by id. The provider manager fills a fresh kernel
/// with the first provider that builds.
#[derive(Clone, Default)]
pub struct Kernel {
    services: HashMap<String, ChatService>,
}

impl Kernel {
    /// Creates an empty kernel
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service` under `service_id`, replacing any previous one
    pub fn add_service(&mut self, service_id: impl Into<String>, service: ChatService) {
        self.services.insert(service_id.into(), service);
    }

    pub fn get_service(&self, service_id: &str) -> Option<&ChatService> {
        self.services.get(service_id)
    }

    /// The service registered under the default id
    pub fn default_service(&self) -> Option<&ChatService> {
        self.get_service(constants::DEFAULT_SERVICE_ID)
    }

    /// Registered ids, sorted
    pub fn service_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.services.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for id in self.service_ids() {
            if let Some(service) = self.services.get(id) {
                map.entry(&id, &format!("{}/{}", service.provider_name(), service.model()));
            }
        }
        map.finish()
    }
}
