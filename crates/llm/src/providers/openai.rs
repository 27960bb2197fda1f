//! OpenAI-compatible chat completions (OpenAI itself, Groq, and other
//! `/v1/chat/completions` speakers).

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{json_reply, text_at, LlmError, LlmProvider, Message};

pub struct OpenAiProvider {
    client: reqwest::Client,
    label: String,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self::with_label("openai", api_key, model, base_url)
    }

    /// Groq exposes the same wire format under `/openai/v1`.
    pub fn groq(api_key: String, model: String, base_url: String) -> Self {
        Self::with_label("groq", api_key, model, base_url)
    }

    fn with_label(label: &str, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            label: label.to_string(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_request_body(
        model: &str,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> serde_json::Value {
        json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        })
    }

    fn extract_content(reply: &serde_json::Value) -> Result<String, LlmError> {
        text_at(reply, "/choices/0/message/content")
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let endpoint = format!("{}/v1/chat/completions", self.base_url);
        debug!(provider = %self.label, model = %self.model, %endpoint, "chat completion");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&Self::build_request_body(&self.model, &messages, temperature, max_tokens))
            .send()
            .await?;
        Self::extract_content(&json_reply(response).await?)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
