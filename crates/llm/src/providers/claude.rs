use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::provider::{json_reply, text_at, LlmError, LlmProvider, Message, Role};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, ANTHROPIC_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// System turns go in the top-level `system` field, joined if there are several.
    fn build_request_body(
        model: &str,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> Value {
        let (system, turns): (Vec<&Message>, Vec<&Message>) =
            messages.iter().partition(|m| m.role == Role::System);

        let mut body = json!({
            "model": model,
            "messages": turns,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });
        if !system.is_empty() {
            let text: Vec<&str> = system.iter().map(|m| m.content.as_str()).collect();
            body["system"] = Value::from(text.join("\n\n"));
        }
        body
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let endpoint = format!("{}/v1/messages", self.base_url);
        debug!(model = %self.model, %endpoint, "anthropic messages");

        let response = self
            .client
            .post(&endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&Self::build_request_body(&self.model, &messages, temperature, max_tokens))
            .send()
            .await?;
        text_at(&json_reply(response).await?, "/content/0/text")
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
