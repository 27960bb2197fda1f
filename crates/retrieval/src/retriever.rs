use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use triage_core::{truncate_chars, RetrievedRecord, SourceKind, NOT_PROVIDED};

use crate::embedding::{Embedder, EmbeddingError};
use crate::index::{l2_normalize, IndexError, IndexRecord, VectorIndex};

/// Snippet length kept from each record's training text.
pub const SNIPPET_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedder returned no vector")]
    EmptyEmbedding,

    #[error("query vector has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Encodes free text and looks up its nearest neighbors in the index.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    /// Pair an index with an encoder, refusing mismatched dimensions.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Result<Self, IndexError> {
        index.check_dimensions(embedder.dimensions())?;
        Ok(Self { index, embedder })
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedRecord>, RetrievalError> {
        if top_k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let mut vector = self
            .embedder
            .embed_batch(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or(RetrievalError::EmptyEmbedding)?;
        if vector.len() != self.index.dimensions() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.index.dimensions(),
                actual: vector.len(),
            });
        }
        l2_normalize(&mut vector);

        let hits = self.index.search(&vector, top_k);
        debug!(embedder = self.embedder.name(), top_k, hits = hits.len(), "index searched");

        Ok(hits
            .iter()
            .enumerate()
            .filter_map(|(i, hit)| {
                let record = self.index.record(hit.row)?;
                Some(to_retrieved(i + 1, hit.row, hit.score, record))
            })
            .collect())
    }
}

fn to_retrieved(rank: usize, row: usize, score: f32, record: &IndexRecord) -> RetrievedRecord {
    RetrievedRecord {
        rank,
        id: record.id.clone().unwrap_or_else(|| format!("record_{row}")),
        similarity_score: round_score(score),
        source: record
            .source
            .as_deref()
            .map(SourceKind::parse)
            .unwrap_or(SourceKind::Unknown),
        training_text: truncate_chars(record.training_text.as_deref().unwrap_or(""), SNIPPET_CHARS)
            .to_string(),
        assignment_group: or_not_provided(&record.assignment_group),
        configuration_item: or_not_provided(&record.configuration_item),
        category: or_not_provided(&record.category),
    }
}

fn or_not_provided(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_PROVIDED.to_string(),
    }
}

/// Clamp to the cosine range and keep four decimals.
fn round_score(score: f32) -> f64 {
    let clamped = f64::from(score).clamp(-1.0, 1.0);
    (clamped * 10_000.0).round() / 10_000.0
}
