//! Language model clients.
//!
//! Concrete [`LanguageModel`] implementations behind `llm.provider`:
//! - **`disabled`**: [`DisabledModel`]; every call fails.
//! - **`openai`**: [`OpenAiModel`]; OpenAI-compatible chat completions.
//! - **`ollama`**: [`OllamaModel`]; a local Ollama `/api/chat` endpoint.
//!
//! # Retry Strategy
//!
//! Both HTTP clients share [`send_with_retry`]:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors and timeouts → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! Exhausting the retries surfaces as [`Error::ModelCall`] from the
//! trait method; callers decide whether that is per-file or fatal.

mod ollama;
mod openai;

pub use ollama::OllamaModel;
pub use openai::OpenAiModel;

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;

use repodoc_core::error::Error;
use repodoc_core::llm::{DisabledModel, LanguageModel};

use crate::config::LlmConfig;

/// Build the model client named by `config.provider`.
pub fn create_model(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledModel)),
        "openai" => Ok(Arc::new(OpenAiModel::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaModel::new(config)?)),
        other => bail!("Unknown llm provider: {}", other),
    }
}

pub(crate) fn http_client(config: &LlmConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt.saturating_sub(1)).min(5))
}

/// POST `body` to `url` and return the decoded JSON response.
///
/// `label` names the backend in error messages.
pub(crate) async fn send_with_retry(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &serde_json::Value,
    max_retries: u32,
    label: &str,
) -> Result<serde_json::Value> {
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            tokio::time::sleep(backoff_delay(attempt)).await;
        }

        let mut request = client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response.json().await?);
                }

                // Rate limited or server error: retry
                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    tracing::warn!(backend = label, %status, attempt, "retryable model API error");
                    last_err = Some(anyhow::anyhow!(
                        "{} API error {}: {}",
                        label,
                        status,
                        body_text
                    ));
                    continue;
                }

                let body_text = response.text().await.unwrap_or_default();
                bail!("{} API error {}: {}", label, status, body_text);
            }
            Err(e) => {
                tracing::warn!(backend = label, attempt, error = %e, "model API request failed");
                last_err = Some(anyhow::anyhow!("{} connection error ({}): {}", label, url, e));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{} call failed after retries", label)))
}

pub(crate) fn model_call_error(e: anyhow::Error) -> Error {
    Error::ModelCall(format!("{:#}", e))
}
