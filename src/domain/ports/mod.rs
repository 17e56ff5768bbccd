//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - Embedder: text to vector
//! - InferenceEngine: prompt to generated text
//!
//! These traits keep the pipeline services independent of specific model servers.

pub mod embedding;
pub mod inference;

pub use embedding::Embedder;
pub use inference::InferenceEngine;
