use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_API_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Redis backs the shared cache. Unset → in-process memory cache.
    pub redis_url: Option<String>,
    /// Unset → every agent runs in rule-based fallback mode.
    pub anthropic_api_key: Option<String>,
    pub llm_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub llm_timeout: Duration,
    pub task_history_limit: usize,
    pub agent_history_limit: usize,
    pub ai_task_analysis: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            llm_api_url: optional_env("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_timeout: Duration::from_secs(
                parse_env("LLM_TIMEOUT_SECS", 30)
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            task_history_limit: parse_env("TASK_HISTORY_LIMIT", 100)
                .context("TASK_HISTORY_LIMIT must be a positive integer")?,
            agent_history_limit: parse_env("AGENT_HISTORY_LIMIT", 50)
                .context("AGENT_HISTORY_LIMIT must be a positive integer")?,
            ai_task_analysis: parse_env("AI_TASK_ANALYSIS", true)
                .context("AI_TASK_ANALYSIS must be true or false")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => Ok(raw.trim().parse::<T>()?),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for in-process tests: no external services.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/conductor_test".to_string(),
            redis_url: None,
            anthropic_api_key: None,
            llm_api_url: DEFAULT_API_URL.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            llm_timeout: Duration::from_secs(1),
            task_history_limit: 10,
            agent_history_limit: 10,
            ai_task_analysis: false,
        }
    }
}
