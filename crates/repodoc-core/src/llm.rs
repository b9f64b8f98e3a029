//! Language model capability.
//!
//! The pipeline only needs "prompt in, text out". Concrete clients (OpenAI,
//! Ollama) live in the `repodoc` crate; tests substitute scripted fakes.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::prompt::{PromptTemplate, PromptVars};

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Send one prompt and return the completion text.
    ///
    /// Fails with [`Error::ModelCall`] on network, auth, timeout, or
    /// malformed-response conditions.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Render `template` with `vars` and complete it.
    async fn complete_template(&self, template: &PromptTemplate, vars: &PromptVars) -> Result<String> {
        let prompt = template.render(vars);
        self.complete(&prompt).await
    }
}

/// Deterministic model for tests and offline runs.
///
/// Replies with a fixed text, or fails when the prompt contains any of the
/// configured needles. Records every prompt it receives.
pub struct ScriptedModel {
    reply: String,
    fail_on: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail_on: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail any prompt containing `needle`.
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on.push(needle.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(needle) = self.fail_on.iter().find(|n| prompt.contains(n.as_str())) {
            return Err(Error::ModelCall(format!("scripted failure on {:?}", needle)));
        }
        Ok(self.reply.clone())
    }
}

/// Model used when `llm.provider = "disabled"`; every call fails.
pub struct DisabledModel;

#[async_trait]
impl LanguageModel for DisabledModel {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::ModelCall(
            "language model provider is disabled".to_string(),
        ))
    }
}
