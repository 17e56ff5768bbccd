//! Clients for locally hosted model servers
//!
//! Two inference backends implement [`InferenceEngine`]:
//! - [`OllamaClient`] for `POST /api/generate`
//! - [`LlamaCppClient`] for the llama.cpp server's `POST /completion`
//!
//! Both check the prompt against the model's context window before sending
//! anything and never retry.

pub mod error;
pub mod llama_cpp;
pub mod ollama;
pub mod types;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{InferenceBackend, ModelConfig, Prompt};
use crate::domain::ports::InferenceEngine;

pub use error::ServerError;
pub use llama_cpp::LlamaCppClient;
pub use ollama::OllamaClient;

/// Characters per token used for prompt size estimates
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the number of tokens in a string using the chars/token heuristic
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Fail with `PromptTooLong` when the prompt plus the generation budget
/// cannot fit in the context window. Returns the prompt's token estimate.
pub fn ensure_fits(prompt: &Prompt, config: &ModelConfig) -> RagResult<usize> {
    let estimated_tokens = estimate_tokens(prompt.as_str());
    let max_tokens = config.max_tokens as usize;

    if estimated_tokens + max_tokens > config.context_window {
        return Err(RagError::PromptTooLong {
            estimated_tokens,
            max_tokens,
            context_window: config.context_window,
        });
    }

    Ok(estimated_tokens)
}

/// Create the inference engine for the configured backend
pub fn create_engine(config: &ModelConfig) -> RagResult<Arc<dyn InferenceEngine>> {
    let engine: Arc<dyn InferenceEngine> = match config.backend {
        InferenceBackend::Ollama => Arc::new(OllamaClient::new()?),
        InferenceBackend::LlamaCpp => Arc::new(LlamaCppClient::new()?),
    };

    tracing::debug!(
        backend = engine.backend_id(),
        base_url = config.base_url(),
        model = %config.model_identifier,
        "inference engine created"
    );

    Ok(engine)
}

/// Shared HTTP client for local servers. Per-request timeouts are set by
/// callers.
pub(crate) fn http_client() -> RagResult<Client> {
    Client::builder()
        .pool_max_idle_per_host(2)
        .tcp_nodelay(true)
        .build()
        .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))
}

/// POST a JSON body and decode a JSON response
pub(crate) async fn post_json<B, R>(
    client: &Client,
    url: &str,
    body: &B,
    timeout: Duration,
) -> Result<R, ServerError>
where
    B: Serialize + ?Sized + Sync,
    R: DeserializeOwned,
{
    tracing::debug!("POST {}", url);

    let response = client
        .post(url)
        .timeout(timeout)
        .json(body)
        .send()
        .await
        .map_err(|e| ServerError::from_reqwest(&e, url, timeout))?;

    decode(response, url, timeout).await
}

/// GET a JSON response
pub(crate) async fn get_json<R: DeserializeOwned>(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<R, ServerError> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| ServerError::from_reqwest(&e, url, timeout))?;

    decode(response, url, timeout).await
}

async fn decode<R: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
    timeout: Duration,
) -> Result<R, ServerError> {
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());
        tracing::warn!(%status, %body, "model server error");
        return Err(ServerError::from_status(status, body));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| ServerError::from_reqwest(&e, url, timeout))
}
