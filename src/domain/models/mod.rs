pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod inference;
pub mod prompt;

pub use chunking::{Chunk, ChunkMetadata, ChunkingConfig};
pub use config::{
    Config, IndexConfig, InputsConfig, LoggingConfig, PromptConfig, RetrievalConfig,
};
pub use document::{Document, DocumentFormat, Page};
pub use embedding::{
    join_chunks, EmbeddingConfig, EmbeddingModelInfo, EmbeddingProvider, IndexEntry, ScoredChunk,
};
pub use inference::{InferenceBackend, ModelConfig};
pub use prompt::{Prompt, PromptTemplate};
