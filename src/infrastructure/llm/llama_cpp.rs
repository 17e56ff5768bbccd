//! llama.cpp server client
//!
//! The server loads a single model at start-up, so `model_identifier` is only
//! used for logging.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::types::{CompletionRequest, CompletionResponse};
use super::{ensure_fits, get_json, http_client, post_json};
use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{ModelConfig, Prompt};
use crate::domain::ports::InferenceEngine;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Inference engine backed by a llama.cpp HTTP server
pub struct LlamaCppClient {
    http_client: Client,
}

impl LlamaCppClient {
    pub fn new() -> RagResult<Self> {
        Ok(Self {
            http_client: http_client()?,
        })
    }
}

#[async_trait]
impl InferenceEngine for LlamaCppClient {
    fn backend_id(&self) -> &str {
        "llama_cpp"
    }

    #[instrument(skip(self, prompt, config), fields(model = %config.model_identifier, max_tokens = config.max_tokens))]
    async fn generate(&self, prompt: &Prompt, config: &ModelConfig) -> RagResult<String> {
        let estimated_tokens = ensure_fits(prompt, config)?;

        let request = CompletionRequest {
            prompt: prompt.as_str(),
            n_predict: config.max_tokens,
            temperature: config.temperature,
            seed: config.seed,
            stream: false,
        };

        let url = format!("{}/completion", config.base_url());
        debug!(estimated_tokens, "sending completion request");

        let response: CompletionResponse =
            post_json(&self.http_client, &url, &request, config.timeout())
                .await
                .map_err(|e| {
                    e.into_rag_error(
                        config.context_window,
                        config.max_tokens as usize,
                        estimated_tokens,
                    )
                })?;

        info!(
            prompt_tokens = response.tokens_evaluated,
            output_tokens = response.tokens_predicted,
            chars = response.content.len(),
            "generation finished"
        );

        Ok(response.content)
    }

    async fn probe(&self, config: &ModelConfig) -> RagResult<()> {
        let url = format!("{}/health", config.base_url());
        let health: HealthResponse = get_json(&self.http_client, &url, PROBE_TIMEOUT)
            .await
            .map_err(|e| RagError::ModelUnavailable(e.to_string()))?;

        if health.status != "ok" {
            return Err(RagError::ModelUnavailable(format!(
                "llama.cpp server at {} reports status '{}'",
                config.base_url(),
                health.status
            )));
        }

        Ok(())
    }
}
