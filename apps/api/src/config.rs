use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// How many question/answer pairs the model is asked to generate per interview.
    pub question_count: u32,
    /// Minimum trimmed answer length (in chars) before a captured answer is scored.
    pub capture_min_chars: usize,
    /// Upper bound on each awaited stage (completion, storage) of a capture cycle.
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let question_count = parse_or("INTERVIEW_QUESTION_COUNT", 5u32)?;
        if question_count == 0 {
            bail!("INTERVIEW_QUESTION_COUNT must be at least 1");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: parse_or("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            question_count,
            capture_min_chars: parse_or("CAPTURE_MIN_CHARS", 10usize)?,
            llm_timeout: Duration::from_secs(parse_or("LLM_TIMEOUT_SECS", 60u64)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests; never touches the process environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/mockprep_test".to_string(),
            gemini_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            question_count: 2,
            capture_min_chars: 10,
            llm_timeout: Duration::from_secs(5),
        }
    }
}
