//! Ollama chat client.

use anyhow::Result;
use async_trait::async_trait;

use repodoc_core::error::Result as CoreResult;
use repodoc_core::llm::LanguageModel;

use super::{http_client, model_call_error, send_with_retry};
use crate::config::LlmConfig;

const DEFAULT_URL: &str = "http://localhost:11434";

/// Calls `POST {url}/api/chat` on a local Ollama instance.
///
/// Requires Ollama to be running with `llm.model` pulled.
pub struct OllamaModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OllamaModel {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let url = config.url.as_deref().unwrap_or(DEFAULT_URL);
        Ok(Self {
            client: http_client(config)?,
            endpoint: format!("{}/api/chat", url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> CoreResult<String> {
        let body = serde_json::json!({
            "model": self.model,
            "stream": false,
            "options": { "temperature": self.temperature },
            "messages": [{ "role": "user", "content": prompt }],
        });

        let json = send_with_retry(
            &self.client,
            &self.endpoint,
            None,
            &body,
            self.max_retries,
            "Ollama",
        )
        .await
        .map_err(model_call_error)?;

        parse_chat_response(&json).map_err(model_call_error)
    }
}

fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "model": "llama3",
            "message": { "role": "assistant", "content": "# Demo" },
            "done": true
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "# Demo");
        assert!(parse_chat_response(&serde_json::json!({ "done": true })).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_model_call_error() {
        let config = LlmConfig {
            provider: "ollama".to_string(),
            url: Some("http://127.0.0.1:9".to_string()),
            max_retries: 0,
            timeout_secs: 2,
            ..LlmConfig::default()
        };
        let model = OllamaModel::new(&config).unwrap();
        let err = model.complete("hello").await.unwrap_err();
        assert!(matches!(err, repodoc_core::Error::ModelCall(_)));
    }
}
