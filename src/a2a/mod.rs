//! Agent-to-agent (A2A) helpers used by the orchestrator to delegate work.
//!
//! Two calls are provided: [`discover_agent`] fetches a remote agent's card,
//! and [`send_message_to_agent`] sends it one text message and flattens the
//! reply into a string. Each call opens its own HTTP client and nothing is
//! retried; transport errors reach the caller as they are.

pub mod types;
mod client;

pub use client::{discover_agent, send_message_to_agent, extract_response_text, agent_card_url};
pub use types::{AgentCard, Artifact, Message, Part, Role, SendMessageResult, Task, TaskState, TaskStatus};
