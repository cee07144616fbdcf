//! Shared configuration and LLM provider selection for CTF attack/defense agents.
//!
//! Every agent in the team loads the same environment-derived [`Settings`],
//! asks a [`ProviderManager`] for a chat-completion service, and delegates
//! work to peer agents over A2A.
//!
//! # Features
//!
//! - **Settings**: environment variables (and `.env`) read once per process
//! - **Provider fallback**: Anthropic, then OpenAI, then the local Ollama
//!   server; the first backend that initializes is used
//! - **Kernels**: named containers holding the selected service
//! - **A2A helpers**: agent discovery and message delegation
//!
//! # Example
//!
//! ```no_run
//! use ctf_ad_shared::{ChatCompletion, LlmRequest, ProviderManager};
//!
//! async fn example() {
//!     let manager = ProviderManager::new().expect("no usable configuration");
//!     println!("primary provider: {}", manager.primary_provider().name);
//!
//!     let kernel = manager.build_default_kernel().expect("all providers failed");
//!     let service = kernel.default_service().unwrap();
//!     let response = service
//!         .generate(&LlmRequest::user("List common CTF web vulnerabilities"))
//!         .await
//!         .unwrap();
//!     println!("{}", response.content);
//! }
//! ```

pub mod a2a;
pub mod config;
pub mod constants;
pub mod errors;
pub mod kernel;
pub mod manager;
pub mod providers;

pub use config::{get_settings, ProviderDescriptor, Settings};
pub use errors::{CtfError, CtfResult};
pub use kernel::Kernel;
pub use manager::ProviderManager;
pub use providers::{
    BuilderRegistry,
    ChatCompletion,
    ChatService,
    LlmRequest,
    LlmResponse,
    ProviderType,
    ServiceBuilder,
};

/// Initialize the logging system
///
/// Call this at the start of an agent binary to see the library's info and
/// warning output. The level is controlled by `RUST_LOG`.
pub fn use_logging() {
    env_logger::init();
}
