/// LLM Client: the single point of entry for completion calls in the shortlister.
///
/// Talks to an Ollama-compatible `/api/generate` endpoint. No other module
/// builds HTTP requests to the model; the reviewer depends on the
/// `CompletionClient` trait so tests can drive it without a server.
///
/// No retries. A failed or timed-out call is reported once and the caller
/// decides what to skip.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl LlmError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Http(e) if e.is_timeout())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// A non-streaming, JSON-mode text completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends one prompt and returns the raw generated text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

/// HTTP client for an Ollama server.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url,
            model,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}{}", self.base_url, GENERATE_PATH)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response.json().await?;

        debug!(
            "LLM call succeeded: model={}, chars={}, prompt_tokens={:?}, output_tokens={:?}",
            self.model,
            generated.response.len(),
            generated.prompt_eval_count,
            generated.eval_count
        );

        // An empty reply is returned as-is; the caller treats it like any
        // other unreadable verdict.
        Ok(generated.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
