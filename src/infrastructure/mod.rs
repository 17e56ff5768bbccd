//! Infrastructure layer module
//!
//! This module contains all infrastructure adapters and external integrations:
//! - Document ingestion (PDF via lopdf, plain text)
//! - Chunking, embedders and the SQLite vector index
//! - Local model server clients (Ollama, llama.cpp)
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod vector;
