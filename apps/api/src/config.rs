use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default so the service starts against a local Ollama.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub llm_timeout_secs: u64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_upload_mb: usize = env_or("MAX_UPLOAD_MB", "25")
            .parse()
            .context("MAX_UPLOAD_MB must be a whole number of megabytes")?;

        Ok(Config {
            ollama_base_url: env_or("OLLAMA_BASE_URL", "http://localhost:11434")
                .trim_end_matches('/')
                .to_string(),
            ollama_model: env_or("OLLAMA_MODEL", "ministral-3:3b"),
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "./uploads")),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            cors_origins: parse_origins(&env_or(
                "CORS_ORIGINS",
                "http://localhost:3000,http://localhost:5173",
            )),
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Splits a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
