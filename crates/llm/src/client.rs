use std::sync::Arc;

use tracing::debug;
use triage_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider, Message};

/// A provider bound to the sampling settings every triage call uses.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(
        llm_config: &LlmConfig,
        ollama_config: &OllamaConfig,
    ) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(llm_config, ollama_config)?;
        Ok(Self::new(provider, llm_config.temperature, llm_config.max_tokens))
    }

    /// Send a single user-turn prompt and return the raw completion text.
    pub async fn complete_prompt(&self, prompt: &str) -> Result<String, LlmError> {
        let started = std::time::Instant::now();
        let output = self
            .provider
            .complete(vec![Message::user(prompt)], self.temperature, self.max_tokens)
            .await?;
        debug!(
            provider = self.provider.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = output.len(),
            "completion received"
        );
        Ok(output)
    }
}
