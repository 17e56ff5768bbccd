//! Embedding port for semantic vector generation.
//!
//! Defines the trait for embedders that convert chunk text into fixed-length
//! dense vectors for similarity search.

use async_trait::async_trait;

use crate::domain::errors::RagResult;
use crate::domain::models::EmbeddingModelInfo;

/// Trait for embedding backends.
///
/// Implementations must be a pure function of the input text for a fixed
/// configuration: re-embedding identical text yields the same vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model descriptor (provider, model id, dimensions).
    fn model(&self) -> &EmbeddingModelInfo;

    /// Embedding dimension for this model.
    fn dimensions(&self) -> usize {
        self.model().dimensions
    }

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>>;

    /// Generate embeddings for several texts, preserving input order.
    async fn embed_all(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Verify the backend can be reached and the model is loaded.
    ///
    /// Fails with `ModelUnavailable` otherwise.
    async fn probe(&self) -> RagResult<()> {
        Ok(())
    }
}
