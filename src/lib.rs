//! rag-review - local retrieval-augmented style review
//!
//! A guideline document and a source file are each chunked, embedded and
//! persisted into their own vector index. The code chunks are retrieved,
//! used to query the guideline index, and the matching rules are composed
//! into a prompt for a locally hosted model, which writes the review.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the `Embedder` /
//!   `InferenceEngine` ports
//! - **Infrastructure Layer** (`infrastructure`): Ingestion, chunking,
//!   embedding, SQLite vector indices, model servers, config and logging
//! - **Service Layer** (`services`): Retrieval, context budgeting and the
//!   review pipeline
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use rag_review::{ConfigLoader, ReviewPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let review = ReviewPipeline::from_config(config)?.run().await?;
//!     println!("{}", review.text);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{RagError, RagResult, Stage, StageError};
pub use domain::models::{Chunk, Config, Document, Prompt, PromptTemplate, ScoredChunk};
pub use domain::ports::{Embedder, InferenceEngine};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::vector::{Chunker, VectorIndex};
pub use services::{Review, ReviewPipeline};
