//! Inference engine port
//!
//! Abstracts the local model server that turns a composed prompt into text.

use async_trait::async_trait;

use crate::domain::errors::RagResult;
use crate::domain::models::{ModelConfig, Prompt};

/// Port trait for local generative model backends
///
/// # Implementations
///
/// - **OllamaClient**: Ollama's `/api/generate`
/// - **LlamaCppClient**: llama.cpp server's `/completion`
///
/// Implementations are `Send + Sync` so a single handle can be shared with
/// the spawned generation task.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Backend identifier (e.g. "ollama")
    fn backend_id(&self) -> &str;

    /// Generate text for a prompt
    ///
    /// # Errors
    /// - `PromptTooLong` - The prompt plus `max_tokens` exceeds `context_window`
    /// - `ModelUnavailable` - The server cannot be reached or rejects the model
    /// - `Timeout` - The HTTP client gave up waiting
    async fn generate(&self, prompt: &Prompt, config: &ModelConfig) -> RagResult<String>;

    /// Verify the server is reachable and knows the configured model
    async fn probe(&self, config: &ModelConfig) -> RagResult<()>;
}
