//! Environment-derived configuration shared by every agent.
//!
//! All values come from environment variables (optionally seeded from a
//! `.env` file) and fall back to defaults suited to a local CTF lab.
//!
//! # Example
//!
//! ```no_run
//! use ctf_ad_shared::config::get_settings;
//!
//! let settings = get_settings().unwrap();
//! for provider in settings.get_available_providers() {
//!     println!("{} ({}) priority {}", provider.name, provider.model, provider.priority);
//! }
//! ```
//!
//! # Environment Variables
//!
//! `ANTHROPIC_API_KEY`, `OPENAI_API_KEY` enable the hosted providers. The
//! local Ollama backend (`OLLAMA_BASE_URL`, `OLLAMA_MODEL`) is always listed
//! as the last resort.

mod types;
mod loader;

pub use types::{Settings, ProviderDescriptor};
pub use loader::get_settings;
