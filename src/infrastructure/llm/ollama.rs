//! Ollama generation client

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::types::{GenerateOptions, GenerateRequest, GenerateResponse, TagsResponse};
use super::{ensure_fits, get_json, http_client, post_json};
use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{ModelConfig, Prompt};
use crate::domain::ports::InferenceEngine;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Inference engine backed by a local Ollama server
pub struct OllamaClient {
    http_client: Client,
}

impl OllamaClient {
    pub fn new() -> RagResult<Self> {
        Ok(Self {
            http_client: http_client()?,
        })
    }
}

#[async_trait]
impl InferenceEngine for OllamaClient {
    fn backend_id(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, prompt, config), fields(model = %config.model_identifier, max_tokens = config.max_tokens))]
    async fn generate(&self, prompt: &Prompt, config: &ModelConfig) -> RagResult<String> {
        let estimated_tokens = ensure_fits(prompt, config)?;

        let request = GenerateRequest {
            model: &config.model_identifier,
            prompt: prompt.as_str(),
            stream: false,
            options: GenerateOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
                seed: config.seed,
                num_ctx: config.context_window,
            },
        };

        let url = format!("{}/api/generate", config.base_url());
        debug!(estimated_tokens, "sending generate request");

        let response: GenerateResponse =
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
            prompt_tokens = response.prompt_eval_count,
            output_tokens = response.eval_count,
            done = response.done,
            chars = response.response.len(),
            "generation finished"
        );

        Ok(response.response)
    }

    async fn probe(&self, config: &ModelConfig) -> RagResult<()> {
        let url = format!("{}/api/tags", config.base_url());
        let tags: TagsResponse = get_json(&self.http_client, &url, PROBE_TIMEOUT)
            .await
            .map_err(|e| RagError::ModelUnavailable(e.to_string()))?;

        if !tags.has_model(&config.model_identifier) {
            return Err(RagError::ModelUnavailable(format!(
                "model '{}' is not installed on {}",
                config.model_identifier,
                config.base_url()
            )));
        }

        debug!(model = %config.model_identifier, "ollama model available");
        Ok(())
    }
}
