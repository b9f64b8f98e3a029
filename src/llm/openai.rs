//! OpenAI-compatible chat completions client.

use anyhow::{bail, Result};
use async_trait::async_trait;

use repodoc_core::error::Result as CoreResult;
use repodoc_core::llm::LanguageModel;

use super::{http_client, model_call_error, send_with_retry};
use crate::config::LlmConfig;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Calls `POST {base}/v1/chat/completions` with a single user message.
///
/// Requires the `OPENAI_API_KEY` environment variable. `llm.url` overrides
/// the base URL for OpenAI-compatible gateways.
pub struct OpenAiModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiModel {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("OPENAI_API_KEY environment variable not set"),
        };
        let base = config.url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        Ok(Self {
            client: http_client(config)?,
            endpoint: format!("{}/v1/chat/completions", base.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> CoreResult<String> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let json = send_with_retry(
            &self.client,
            &self.endpoint,
            Some(&self.api_key),
            &body,
            self.max_retries,
            "OpenAI",
        )
        .await
        .map_err(model_call_error)?;

        parse_chat_response(&json).map_err(model_call_error)
    }
}

/// Extract `choices[0].message.content`.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing choices[0].message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "- does things" } }]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "- does things");
    }

    #[test]
    fn test_parse_rejects_missing_content() {
        let json = serde_json::json!({ "choices": [] });
        assert!(parse_chat_response(&json).is_err());
        let json = serde_json::json!({ "error": { "message": "nope" } });
        assert!(parse_chat_response(&json).is_err());
    }
}
