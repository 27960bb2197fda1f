pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use triage_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

const OPENAI_BASE_URL: &str = "https://api.openai.com";

fn require_key(key: &Option<String>, var: &str) -> Result<String, LlmError> {
    key.clone()
        .ok_or_else(|| LlmError::NotConfigured(format!("{var} not set")))
}

/// Pick the chat backend named by `LLM_PROVIDER`.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider: Arc<dyn LlmProvider> = match llm_config.provider.to_lowercase().as_str() {
        "groq" => Arc::new(openai::OpenAiProvider::groq(
            require_key(&llm_config.groq_api_key, "GROQ_API_KEY")?,
            llm_config.groq_model.clone(),
            llm_config.groq_base_url.clone(),
        )),
        "openai" => Arc::new(openai::OpenAiProvider::new(
            require_key(&llm_config.openai_api_key, "OPENAI_API_KEY")?,
            llm_config.openai_model.clone(),
            llm_config
                .openai_base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
        )),
        "anthropic" | "claude" => Arc::new(claude::ClaudeProvider::new(
            require_key(&llm_config.anthropic_api_key, "ANTHROPIC_API_KEY")?,
            llm_config.anthropic_model.clone(),
        )),
        "gemini" => Arc::new(gemini::GeminiProvider::new(
            require_key(&llm_config.gemini_api_key, "GEMINI_API_KEY")?,
            llm_config.gemini_model.clone(),
        )),
        "ollama" => Arc::new(ollama::OllamaProvider::new(
            ollama_config.url.clone(),
            ollama_config.model.clone(),
        )),
        other => {
            return Err(LlmError::NotConfigured(format!("unknown LLM provider: '{other}'")));
        }
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(provider: &str) -> LlmConfig {
        let mut config = triage_core::Config::for_profile("LLMTEST").llm;
        config.provider = provider.to_string();
        config.groq_api_key = None;
        config
    }

    fn ollama() -> OllamaConfig {
        triage_core::Config::for_profile("LLMTEST").ollama
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = create_provider(&llm("groq"), &ollama()).err().unwrap();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = create_provider(&llm("watson"), &ollama()).err().unwrap();
        assert!(err.to_string().contains("watson"));
    }

    #[test]
    fn groq_key_selects_groq_backend() {
        let mut config = llm("GROQ");
        config.groq_api_key = Some("gsk_test".into());
        let provider = create_provider(&config, &ollama()).unwrap();
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn ollama_needs_no_key() {
        let provider = create_provider(&llm("ollama"), &ollama()).unwrap();
        assert_eq!(provider.name(), "ollama");
    }
}
