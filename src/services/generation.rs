//! Generation task boundary
//!
//! The inference call runs as its own tokio task bounded by the configured
//! timeout. The task is aborted when the timeout fires and when the awaiting
//! future is dropped (e.g. on Ctrl-C), which drops the in-flight request.

use std::sync::Arc;
use tokio::task::AbortHandle;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{ModelConfig, Prompt};
use crate::domain::ports::InferenceEngine;

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run `engine.generate` on a spawned task with `config.timeout()`
pub async fn generate_with_timeout(
    engine: Arc<dyn InferenceEngine>,
    prompt: Prompt,
    config: ModelConfig,
) -> RagResult<String> {
    let timeout = config.timeout();
    let backend = engine.backend_id().to_string();

    let mut handle = tokio::spawn(async move { engine.generate(&prompt, &config).await });
    let _abort = AbortOnDrop(handle.abort_handle());

    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(RagError::Io(std::io::Error::other(format!(
            "generation task failed: {join_error}"
        )))),
        Err(_) => {
            tracing::warn!(backend = %backend, ?timeout, "generation timed out, aborting");
            Err(RagError::Timeout(timeout))
        }
    }
}
