//! Vector infrastructure components
//!
//! Provides implementations for embedding generation, text chunking,
//! and the persisted vector index used for retrieval.

pub mod chunker;
pub mod embedding_service;
pub mod ollama_embedder;
pub mod vector_store;

use std::sync::Arc;

use crate::domain::errors::RagResult;
use crate::domain::models::{EmbeddingConfig, EmbeddingProvider};
use crate::domain::ports::Embedder;

pub use chunker::Chunker;
pub use embedding_service::{HashingEmbedder, HASHING_MODEL_ID};
pub use ollama_embedder::OllamaEmbedder;
pub use vector_store::{cosine_similarity, VectorIndex};

/// Create the embedder for the configured provider
pub fn create_embedder(config: &EmbeddingConfig) -> RagResult<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.provider {
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)?),
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(config)?),
    };

    tracing::debug!(model = %embedder.model(), "embedder created");
    Ok(embedder)
}
