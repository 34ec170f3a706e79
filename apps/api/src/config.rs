use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MODEL;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Application configuration loaded from environment variables.
/// Every key has a default; the provider API key is supplied per request and
/// never read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub gemini_base_url: String,
    /// Fast-tier model used when model discovery fails or finds nothing.
    pub default_model: String,
    /// Delay between the decorative status messages shown while evaluating.
    pub status_step_ms: u64,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            default_model: std::env::var("GEMINI_DEFAULT_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            status_step_ms: parse_env("STATUS_STEP_MS", 700)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_idle_secs: parse_env("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            status_step_ms: 700,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("SCREENER_TEST_UNSET_PORT", 9090).unwrap();
        assert_eq!(port, 9090);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("SCREENER_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = parse_env("SCREENER_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("SCREENER_TEST_BAD_PORT");
    }

    #[test]
    fn test_default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.status_step_ms, 700);
        assert_eq!(config.default_model, "gemini-1.5-flash");
        assert_eq!(config.session_idle_secs, 1800);
        assert!(!config.gemini_base_url.ends_with('/'));
    }
}
