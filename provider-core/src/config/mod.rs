use crate::error::ApiError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::time::Duration;

/// Process-wide settings shared by every provider client.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_token_refresh_margin_secs")]
    pub token_refresh_margin_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_token_refresh_margin_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            otlp_endpoint: None,
            http_timeout_secs: default_http_timeout_secs(),
            token_refresh_margin_secs: default_token_refresh_margin_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn token_refresh_margin(&self) -> Duration {
        Duration::from_secs(self.token_refresh_margin_secs)
    }
}

/// Read a variable that has no safe default. Absence is a startup failure.
pub fn require_env<F>(lookup: &F, key: &str) -> Result<String, ApiError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(ApiError::ConfigError(anyhow::anyhow!(
            "{} is required but not set",
            key
        ))),
    }
}

/// Read a variable, falling back to `default` when it is unset or blank.
pub fn env_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|val| !val.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Lookup backed by the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn require_env_fails_on_missing_or_blank() {
        let lookup = lookup_from(&[("PRESENT", "value"), ("BLANK", "  ")]);

        assert_eq!(require_env(&lookup, "PRESENT").unwrap(), "value");

        let err = require_env(&lookup, "MISSING").unwrap_err();
        assert!(err.to_string().contains("MISSING is required"));

        assert!(require_env(&lookup, "BLANK").is_err());
    }

    #[test]
    fn env_or_uses_default() {
        let lookup = lookup_from(&[("SET", "custom")]);
        assert_eq!(env_or(&lookup, "SET", "fallback"), "custom");
        assert_eq!(env_or(&lookup, "UNSET", "fallback"), "fallback");
    }

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.token_refresh_margin(), Duration::from_secs(30));
    }
}
