pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use triage_core::config::Config;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

/// Build the embedder named by `EMBEDDING_PROVIDER`.
pub fn create_embedder(config: &Config) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    let dimensions = config.embedding.dimensions as usize;
    match config.embedding.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            config.ollama.url.clone(),
            config.ollama.embedding_model.clone(),
            dimensions,
        ))),
        "openai" => {
            let api_key = config
                .llm
                .openai_api_key
                .clone()
                .ok_or_else(|| EmbeddingError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            Ok(Arc::new(OpenAiEmbedder::new(
                api_key,
                config.embedding.model.clone(),
                config.llm.openai_base_url.clone(),
                dimensions,
            )?))
        }
        other => Err(EmbeddingError::NotConfigured(format!(
            "unknown embedding provider: '{other}'"
        ))),
    }
}
