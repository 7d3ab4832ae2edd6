//! Server configuration, read once from the environment at start-up.

use std::time::Duration;

use mirror_ai::providers::ProviderConfig;
use mirror_database::db::{DEFAULT_DATABASE_URL, DEFAULT_STATEMENT_TIMEOUT, parse_timeout_secs};
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Invalid configuration value.
#[derive(Debug, Error)]
#[error("Invalid {name}: {message}")]
pub struct ConfigError {
    /// Environment variable name.
    pub name: &'static str,
    /// What was wrong with it.
    pub message: String,
}

/// Validated server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `BIND_ADDR`
    pub bind_addr: String,
    /// `PORT`
    pub port: u16,
    /// `DB_STATEMENT_TIMEOUT_SECS`
    pub statement_timeout: Duration,
    /// `TOMTOM_API_KEY`; routing answers 503 without it.
    pub tomtom_api_key: Option<String>,
    /// `ROUTING_BASE_URL`
    pub routing_base_url: String,
    /// `AI_PROVIDER`, `ANTHROPIC_API_KEY`, `AI_MODEL`
    pub ai: ProviderConfig,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Blank values count as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError {
                name: "PORT",
                message: format!("'{value}': {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let statement_timeout = match var("DB_STATEMENT_TIMEOUT_SECS") {
            Some(value) => parse_timeout_secs(&value).map_err(|message| ConfigError {
                name: "DB_STATEMENT_TIMEOUT_SECS",
                message,
            })?,
            None => DEFAULT_STATEMENT_TIMEOUT,
        };

        let routing_base_url =
            var("ROUTING_BASE_URL").unwrap_or_else(|| mirror_routing::DEFAULT_BASE_URL.to_string());
        if !routing_base_url.starts_with("http://") && !routing_base_url.starts_with("https://") {
            return Err(ConfigError {
                name: "ROUTING_BASE_URL",
                message: format!("'{routing_base_url}' is not an http(s) URL"),
            });
        }

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port,
            statement_timeout,
            tomtom_api_key: var("TOMTOM_API_KEY"),
            routing_base_url,
            ai: ProviderConfig {
                provider: var("AI_PROVIDER"),
                api_key: var("ANTHROPIC_API_KEY"),
                model: var("AI_MODEL"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.statement_timeout, DEFAULT_STATEMENT_TIMEOUT);
        assert_eq!(config.tomtom_api_key, None);
        assert_eq!(config.ai, ProviderConfig::default());
    }

    #[test]
    fn reads_values() {
        let config = config(&[
            ("PORT", "9090"),
            ("DB_STATEMENT_TIMEOUT_SECS", "5"),
            ("TOMTOM_API_KEY", "abc"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("AI_MODEL", "claude-test"),
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.statement_timeout, Duration::from_secs(5));
        assert_eq!(config.tomtom_api_key.as_deref(), Some("abc"));
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.ai.model.as_deref(), Some("claude-test"));
    }

    #[test]
    fn blank_key_is_unset() {
        let config = config(&[("TOMTOM_API_KEY", "   ")]).unwrap();
        assert_eq!(config.tomtom_api_key, None);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(config(&[("PORT", "eighty")]).unwrap_err().name, "PORT");
        assert_eq!(config(&[("PORT", "70000")]).unwrap_err().name, "PORT");
        assert_eq!(
            config(&[("DB_STATEMENT_TIMEOUT_SECS", "0")])
                .unwrap_err()
                .name,
            "DB_STATEMENT_TIMEOUT_SECS"
        );
        assert_eq!(
            config(&[("ROUTING_BASE_URL", "api.tomtom.com")])
                .unwrap_err()
                .name,
            "ROUTING_BASE_URL"
        );
    }
}
