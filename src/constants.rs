use std::time::Duration;

// General
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_SERVICE_ID: &str = "default";

// Provider names and precedence
pub const ANTHROPIC_PROVIDER: &str = "anthropic";
pub const OPENAI_PROVIDER: &str = "openai";
pub const OLLAMA_PROVIDER: &str = "ollama";
pub const ANTHROPIC_PRIORITY: u32 = 1;
pub const OPENAI_PRIORITY: u32 = 2;
pub const OLLAMA_PRIORITY: u32 = 99;
pub const TEAM_SHARED_PRIORITY: u32 = 0;

// OpenAI
pub const OPENAI_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

// Anthropic
pub const ANTHROPIC_API_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

// Ollama
pub const OLLAMA_CHAT_PATH: &str = "/api/chat";

// HTTP
pub const PROVIDER_HTTP_TIMEOUT: Duration = Duration::from_secs(120);
pub const A2A_SEND_TIMEOUT: Duration = Duration::from_secs(120);

// A2A
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";
pub const A2A_SEND_METHOD: &str = "message/send";
pub const JSONRPC_VERSION: &str = "2.0";
pub const NO_RESULT_SENTINEL: &str = "[Agent returned no result]";
pub const EMPTY_RESPONSE_SENTINEL: &str = "[Agent returned empty response]";

// Environment defaults
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_TEAM_SHARED_PROVIDER: &str = "anthropic";
pub const DEFAULT_TEAM_SHARED_RATE_LIMIT: u32 = 30;
pub const DEFAULT_AGENT_HOST: &str = "0.0.0.0";
pub const DEFAULT_ORCHESTRATOR_PORT: u16 = 8000;
pub const DEFAULT_VULN_AGENT_PORT: u16 = 8001;
pub const DEFAULT_VM_IP: &str = "10.60.1.1";
pub const DEFAULT_FLAG_REGEX: &str = r"[A-Z0-9]{31}=";
pub const DEFAULT_TICK_DURATION_SECS: u64 = 120;
pub const DEFAULT_VULNBOX_SSH_HOST: &str = "10.60.1.1";
pub const DEFAULT_VULNBOX_SSH_PORT: u16 = 22;
pub const DEFAULT_VULNBOX_SSH_USER: &str = "root";
pub const DEFAULT_VULNBOX_SSH_KEY_PATH: &str = "~/.ssh/id_rsa";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";
