//! Embedding domain models
//!
//! Models for vector embeddings and retrieval. These models define the core
//! embedding functionality in a framework-agnostic way.

use serde::{Deserialize, Serialize};

use super::chunking::Chunk;

/// Embedding backends supported by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    /// Feature-hashing embedder, computed in-process
    /// - No model artifacts required
    /// - Deterministic
    Hashing,

    /// Local Ollama server (`/api/embed`)
    Ollama,
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hashing => write!(f, "hashing"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Which backend produces the vectors
    #[serde(default = "default_provider")]
    pub provider: EmbeddingProvider,

    /// Model identifier (e.g. `all-minilm` for Ollama)
    #[serde(default = "default_model")]
    pub model: String,

    /// Vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Base URL of the local embedding server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_provider() -> EmbeddingProvider {
    EmbeddingProvider::Hashing
}

fn default_model() -> String {
    "all-minilm".to_string()
}

const fn default_dimensions() -> usize {
    384
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimensions: default_dimensions(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Identity of the model that produced a set of vectors. An index records the
/// descriptor it was built with so that queries can be checked against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub provider: EmbeddingProvider,
    pub model_id: String,
    pub dimensions: usize,
}

impl EmbeddingModelInfo {
    pub fn new(provider: EmbeddingProvider, model_id: impl Into<String>, dimensions: usize) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
            dimensions,
        }
    }
}

impl std::fmt::Display for EmbeddingModelInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({}d)", self.provider, self.model_id, self.dimensions)
    }
}

/// A chunk paired with its embedding; the unit stored in a vector index.
/// The chunk id identifies the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self { chunk, embedding }
    }

    pub fn id(&self) -> &str {
        &self.chunk.id
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// A retrieved chunk with its cosine similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Join retrieved chunk texts with a blank line between them
pub fn join_chunks(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
