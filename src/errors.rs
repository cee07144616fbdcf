use std::error::Error;
use std::fmt;

/// Error type shared by the settings, provider and A2A layers
#[derive(Debug)]
pub enum CtfError {
    /// Invalid or missing configuration
    ConfigError(String),
    /// A provider builder could not construct its chat service
    BuildError { provider: String, reason: String },
    /// Every candidate provider was skipped or failed to build
    ProvidersExhausted { last_error: Option<Box<CtfError>> },
    /// Error from the HTTP client, passed through untouched
    RequestError(reqwest::Error),
    /// Error reported by a remote API or agent
    ApiError(String),
    /// Parsing error
    ParseError(String),
}

impl fmt::Display for CtfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CtfError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            CtfError::BuildError { provider, reason } => {
                write!(f, "Failed to build provider '{}': {}", provider, reason)
            }
            CtfError::ProvidersExhausted { last_error: Some(err) } => {
                write!(f, "All LLM providers failed. Last error: {}", err)
            }
            CtfError::ProvidersExhausted { last_error: None } => {
                write!(f, "All LLM providers failed. Last error: no provider had a registered builder")
            }
            CtfError::RequestError(err) => write!(f, "Request error: {}", err),
            CtfError::ApiError(msg) => write!(f, "API error: {}", msg),
            CtfError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl Error for CtfError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CtfError::RequestError(err) => Some(err),
            CtfError::ProvidersExhausted { last_error: Some(err) } => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Convert reqwest errors to CtfError
impl From<reqwest::Error> for CtfError {
    fn from(err: reqwest::Error) -> Self {
        CtfError::RequestError(err)
    }
}

/// Convert serde_json errors to CtfError
impl From<serde_json::Error> for CtfError {
    fn from(err: serde_json::Error) -> Self {
        CtfError::ParseError(err.to_string())
    }
}

/// Convert URL parsing errors to CtfError
impl From<url::ParseError> for CtfError {
    fn from(err: url::ParseError) -> Self {
        CtfError::ConfigError(format!("Invalid URL: {}", err))
    }
}

/// Convert regex compilation errors to CtfError
impl From<regex::Error> for CtfError {
    fn from(err: regex::Error) -> Self {
        CtfError::ConfigError(format!("Invalid regular expression: {}", err))
    }
}

/// Result type alias for this crate
pub type CtfResult<T> = Result<T, CtfError>;

impl CtfError {
    /// Shorthand for a builder failure tagged with the provider name
    pub fn build(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        CtfError::BuildError {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Maps a non-success API response into an ApiError carrying status and body
    pub fn from_api_response(provider: &str, status: reqwest::StatusCode, body: String) -> Self {
        CtfError::ApiError(format!("{} API error ({}): {}", provider, status, body))
    }
}
