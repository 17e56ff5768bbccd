//! Top-k retrieval over a vector index

use std::sync::Arc;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::ScoredChunk;
use crate::domain::ports::Embedder;
use crate::infrastructure::vector::VectorIndex;

/// A vector index paired with the embedder it was built with and a fixed k
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    k: usize,
}

impl Retriever {
    /// # Returns
    /// * `Err(RagError::DimensionMismatch)` - If the embedder is not the model
    ///   the index was built with
    /// * `Err(RagError::Config)` - If `k` is zero
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>, k: usize) -> RagResult<Self> {
        if k == 0 {
            return Err(RagError::Config("retrieval k must be greater than 0".to_string()));
        }

        let indexed = index.model();
        let current = embedder.model();
        if indexed != current {
            return Err(RagError::DimensionMismatch {
                expected: indexed.to_string(),
                actual: current.to_string(),
            });
        }

        Ok(Self { index, embedder, k })
    }

    /// The `k` chunks most relevant to `query`, best first
    pub async fn retrieve(&self, query: &str) -> RagResult<Vec<ScoredChunk>> {
        let vector = self.embedder.embed(query).await?;
        let results = self.index.query(&vector, self.k)?;

        tracing::info!(
            index = self.index.name(),
            k = self.k,
            retrieved = results.len(),
            "retrieved chunks"
        );

        Ok(results)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}
