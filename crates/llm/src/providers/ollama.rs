use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::provider::{json_reply, text_at, LlmError, LlmProvider, Message};

/// Local models through Ollama's non-streaming `/api/chat`.
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn chat_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": { "temperature": temperature, "num_predict": max_tokens },
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let endpoint = format!("{}/api/chat", self.url);
        debug!(model = %self.model, %endpoint, "ollama chat");

        let response = self
            .client
            .post(&endpoint)
            .json(&self.chat_body(&messages, temperature, max_tokens))
            .send()
            .await?;
        text_at(&json_reply(response).await?, "/message/content")
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
