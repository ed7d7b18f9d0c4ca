//! Server Configuration
//!
//! Built once at startup from environment variables (a `.env` file is loaded
//! first by `main`) and handed to each adapter.

use std::str::FromStr;
use std::time::Duration;

use agent_core::{AgentConfig, GenerationOptions};
use agent_runtime::{OpenAiConfig, SupabaseConfig, openai::DEFAULT_BASE_URL};
use thiserror::Error;

/// Configuration errors (fatal at startup)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Listen address
    pub bind_addr: String,

    /// Completion provider settings
    pub openai: OpenAiConfig,

    /// Remote store settings; `None` keeps history in memory
    pub store: Option<SupabaseConfig>,

    /// Agent loop bounds
    pub agent: AgentConfig,

    /// Messages loaded as history per turn
    pub history_limit: usize,

    /// Deadline for loading history
    pub store_timeout: Duration,
}

impl GatewayConfig {
    /// Load from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `get` to read variables
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let provider_timeout =
            Duration::from_millis(parse(&var, "AGENT_PROVIDER_TIMEOUT_MS", 60_000_u64)?);
        let store_timeout =
            Duration::from_millis(parse(&var, "AGENT_STORE_TIMEOUT_MS", 3_000_u64)?);

        let defaults = GenerationOptions::default();
        let openai = OpenAiConfig {
            api_key,
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            generation: GenerationOptions {
                model: var("AGENT_MODEL").unwrap_or_else(|| defaults.model.clone()),
                temperature: parse(&var, "AGENT_TEMPERATURE", defaults.temperature)?,
                ..defaults
            },
            timeout: provider_timeout,
        };

        let store = match var("SUPABASE_URL") {
            Some(url) => {
                let key = var("SUPABASE_SERVICE_ROLE_KEY")
                    .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;
                let mut store = SupabaseConfig::new(url, key);
                store.timeout = store_timeout;
                Some(store)
            }
            None => None,
        };

        let agent = AgentConfig {
            max_tool_calls_per_turn: parse(&var, "AGENT_MAX_TOOL_CALLS", 5)?,
            provider_timeout,
            provider_retries: parse(&var, "AGENT_PROVIDER_RETRIES", 1)?,
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            openai,
            store,
            agent,
            history_limit: parse(&var, "AGENT_HISTORY_LIMIT", 10)?,
            store_timeout,
        })
    }
}

fn parse<T>(
    var: impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();

        assert_eq!(config.openai.generation.model, "gpt-4");
        assert_eq!(config.openai.base_url, DEFAULT_BASE_URL);
        assert!(config.store.is_none());
        assert_eq!(config.agent.max_tool_calls_per_turn, 5);
        assert_eq!(config.agent.provider_retries, 1);
        assert_eq!(config.agent.provider_timeout, Duration::from_secs(60));
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("AGENT_MODEL", "gpt-4o-mini"),
            ("AGENT_MAX_TOOL_CALLS", "2"),
            ("AGENT_PROVIDER_TIMEOUT_MS", "1500"),
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ])
        .unwrap();

        assert_eq!(config.openai.generation.model, "gpt-4o-mini");
        assert_eq!(config.agent.max_tool_calls_per_turn, 2);
        assert_eq!(config.openai.timeout, Duration::from_millis(1500));
        let store = config.store.unwrap();
        assert_eq!(store.base_url, "https://example.supabase.co");
        assert_eq!(store.table, "ai_messages");
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("OPENAI_API_KEY"))));
    }

    #[test]
    fn test_store_url_requires_key() {
        let err = load(&[("OPENAI_API_KEY", "sk"), ("SUPABASE_URL", "https://x")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY")));
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("OPENAI_API_KEY", "sk"), ("AGENT_MAX_TOOL_CALLS", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "AGENT_MAX_TOOL_CALLS", .. }));
    }
}
