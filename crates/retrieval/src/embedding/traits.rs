use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedder not configured: {0}")]
    NotConfigured(String),
}

/// Text encoder producing vectors comparable with the index.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn dimensions(&self) -> usize;

    fn name(&self) -> &str;
}

/// Turn a non-2xx reply into `EmbeddingError::Api` carrying status and body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, EmbeddingError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EmbeddingError::Api(format!("{status}: {body}")))
}

/// A batch reply must hold exactly one vector per input, each of `dimensions` floats.
pub(crate) fn check_batch(
    vectors: Vec<Vec<f32>>,
    inputs: usize,
    dimensions: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if vectors.len() != inputs {
        return Err(EmbeddingError::Api(format!(
            "expected {inputs} embeddings, got {}",
            vectors.len()
        )));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimensions,
            actual: bad.len(),
        });
    }
    Ok(vectors)
}
