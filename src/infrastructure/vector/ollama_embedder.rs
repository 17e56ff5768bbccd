//! Embeddings from a local Ollama server (`POST /api/embed`)

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{EmbeddingConfig, EmbeddingModelInfo, EmbeddingProvider};
use crate::domain::ports::Embedder;
use crate::infrastructure::llm::types::{EmbedRequest, EmbedResponse};
use crate::infrastructure::llm::{http_client, post_json};

/// Texts sent per request
const BATCH_SIZE: usize = 32;

/// Embedder backed by an Ollama embedding model
pub struct OllamaEmbedder {
    http_client: Client,
    model: EmbeddingModelInfo,
    base_url: String,
    timeout: Duration,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> RagResult<Self> {
        if config.dimensions == 0 {
            return Err(RagError::Config(
                "embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            http_client: http_client()?,
            model: EmbeddingModelInfo::new(
                EmbeddingProvider::Ollama,
                config.model.clone(),
                config.dimensions,
            ),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model.model_id,
            input: texts,
        };

        let response: EmbedResponse = post_json(&self.http_client, &url, &request, self.timeout)
            .await
            .map_err(RagError::from)?;

        if response.embeddings.len() != texts.len() {
            return Err(RagError::ModelUnavailable(format!(
                "expected {} embeddings, server returned {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        if let Some(bad) = response
            .embeddings
            .iter()
            .find(|e| e.len() != self.model.dimensions)
        {
            return Err(RagError::DimensionMismatch {
                expected: self.model.to_string(),
                actual: format!("{}d from {}", bad.len(), self.model.model_id),
            });
        }

        Ok(response.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model(&self) -> &EmbeddingModelInfo {
        &self.model
    }

    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut embeddings = self.embed_batch(&[text]).await?;
        embeddings
            .pop()
            .ok_or_else(|| RagError::ModelUnavailable("empty embedding response".to_string()))
    }

    async fn embed_all(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            embeddings.extend(self.embed_batch(batch).await?);
        }

        tracing::debug!(
            model = %self.model,
            texts = texts.len(),
            "embedded batch via ollama"
        );

        Ok(embeddings)
    }

    /// Embed a probe string, which also verifies the configured dimensions
    async fn probe(&self) -> RagResult<()> {
        self.embed("probe").await.map(|_| ())
    }
}
