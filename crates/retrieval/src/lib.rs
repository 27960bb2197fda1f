pub mod context;
pub mod embedding;
pub mod index;
pub mod retriever;

pub use context::{assignment_context, group_from_top_incident, suggestion_context};
pub use embedding::{create_embedder, Embedder, EmbeddingError};
pub use index::{write_index, IndexError, IndexRecord, VectorIndex};
pub use retriever::{RetrievalError, Retriever};
