//! Environment loading and the process-wide settings accessor.

use std::env;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use log::{debug, info};

use crate::errors::{CtfError, CtfResult};
use super::types::Settings;

static SETTINGS: Mutex<Option<&'static Settings>> = Mutex::new(None);

/// Returns the process-wide settings, loading them on first use.
///
/// The first call reads an optional `.env` file and then the environment.
/// Later calls return the same instance and never look at the environment
/// again. First access is serialized by a mutex, so concurrent callers all
/// observe a single load. A failed load leaves nothing cached.
///
/// # Example
/// ```no_run
/// use ctf_ad_shared::config::get_settings;
///
/// let settings = get_settings().unwrap();
/// println!("target VM: {}", settings.vm_ip);
/// ```
pub fn get_settings() -> CtfResult<&'static Settings> {
    let mut slot = SETTINGS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(settings) = *slot {
        return Ok(settings);
    }

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment overrides from {}", path.display());
    }

    let settings: &'static Settings = Box::leak(Box::new(Settings::from_env()?));
    info!(
        "Settings loaded: {} LLM provider(s) available, vm_ip={}",
        settings.get_available_providers().len(),
        settings.vm_ip
    );
    *slot = Some(settings);
    Ok(settings)
}

impl Settings {
    /// Reads settings from the current process environment.
    pub fn from_env() -> CtfResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    ///
    /// Unset variables take their defaults. Numeric variables that are set
    /// but do not parse are reported as configuration errors.
    pub fn from_lookup<F>(lookup: F) -> CtfResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        Ok(Settings {
            anthropic_api_key: string_var(&lookup, "ANTHROPIC_API_KEY", &defaults.anthropic_api_key),
            anthropic_model: string_var(&lookup, "ANTHROPIC_MODEL", &defaults.anthropic_model),
            openai_api_key: string_var(&lookup, "OPENAI_API_KEY", &defaults.openai_api_key),
            openai_model: string_var(&lookup, "OPENAI_MODEL", &defaults.openai_model),
            ollama_base_url: string_var(&lookup, "OLLAMA_BASE_URL", &defaults.ollama_base_url),
            ollama_model: string_var(&lookup, "OLLAMA_MODEL", &defaults.ollama_model),

            team_shared_provider: string_var(&lookup, "TEAM_SHARED_PROVIDER", &defaults.team_shared_provider),
            team_shared_api_key: string_var(&lookup, "TEAM_SHARED_API_KEY", &defaults.team_shared_api_key),
            team_shared_rate_limit: parse_var(&lookup, "TEAM_SHARED_RATE_LIMIT", defaults.team_shared_rate_limit)?,

            orchestrator_host: string_var(&lookup, "ORCHESTRATOR_HOST", &defaults.orchestrator_host),
            orchestrator_port: parse_var(&lookup, "ORCHESTRATOR_PORT", defaults.orchestrator_port)?,
            vuln_agent_host: string_var(&lookup, "VULN_AGENT_HOST", &defaults.vuln_agent_host),
            vuln_agent_port: parse_var(&lookup, "VULN_AGENT_PORT", defaults.vuln_agent_port)?,

            vm_ip: string_var(&lookup, "VM_IP", &defaults.vm_ip),
            flag_regex: string_var(&lookup, "FLAG_REGEX", &defaults.flag_regex),
            tick_duration_secs: parse_var(&lookup, "TICK_DURATION", defaults.tick_duration_secs)?,

            vulnbox_ssh_host: string_var(&lookup, "VULNBOX_SSH_HOST", &defaults.vulnbox_ssh_host),
            vulnbox_ssh_port: parse_var(&lookup, "VULNBOX_SSH_PORT", defaults.vulnbox_ssh_port)?,
            vulnbox_ssh_user: string_var(&lookup, "VULNBOX_SSH_USER", &defaults.vulnbox_ssh_user),
            vulnbox_ssh_key_path: string_var(&lookup, "VULNBOX_SSH_KEY_PATH", &defaults.vulnbox_ssh_key_path),

            redis_url: string_var(&lookup, "REDIS_URL", &defaults.redis_url),
        })
    }
}

fn string_var<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> CtfResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            CtfError::ConfigError(format!(
                "Environment variable '{}' has invalid value '{}': {}",
                key, raw, e
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.anthropic_model, "claude-sonnet-4-5-20250929");
        assert_eq!(settings.openai_model, "gpt-4o");
        assert_eq!(settings.ollama_base_url, "http://localhost:11434");
        assert_eq!(settings.ollama_model, "llama3.2:3b");
        assert_eq!(settings.team_shared_rate_limit, 30);
        assert_eq!(settings.orchestrator_port, 8000);
        assert_eq!(settings.vuln_agent_port, 8001);
        assert_eq!(settings.flag_regex, "[A-Z0-9]{31}=");
        assert_eq!(settings.tick_duration_secs, 120);
        assert_eq!(settings.vulnbox_ssh_port, 22);
        assert_eq!(settings.redis_url, "redis://localhost:6379/0");
    }

    #[test]
    fn test_values_override_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OPENAI_MODEL", "gpt-4.1"),
            ("ORCHESTRATOR_PORT", " 9000 "),
            ("VM_IP", "10.60.7.1"),
        ]))
        .unwrap();

        assert_eq!(settings.openai_model, "gpt-4.1");
        assert_eq!(settings.orchestrator_port, 9000);
        assert_eq!(settings.vm_ip, "10.60.7.1");
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let result = Settings::from_lookup(lookup_from(&[("TICK_DURATION", "two minutes")]));
        let err = result.unwrap_err();
        assert!(matches!(err, CtfError::ConfigError(_)));
        assert!(err.to_string().contains("TICK_DURATION"));
    }

    #[test]
    fn test_port_out_of_range_is_config_error() {
        let result = Settings::from_lookup(lookup_from(&[("VULNBOX_SSH_PORT", "70000")]));
        assert!(result.is_err());
    }
}
