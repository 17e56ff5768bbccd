//! Context budgeting for the review prompt.
//!
//! Keeps the longest prefix of ranked context chunks whose composed prompt
//! fits the model's context window minus the generation budget. Chunks are
//! kept or dropped whole; text is never cut inside a chunk.

use crate::domain::errors::RagResult;
use crate::domain::models::{join_chunks, ModelConfig, Prompt, PromptTemplate, ScoredChunk};
use crate::infrastructure::llm::estimate_tokens;

/// Prompt composed within budget, with what was kept and dropped
#[derive(Debug, Clone)]
pub struct FittedPrompt {
    pub prompt: Prompt,
    pub kept: Vec<ScoredChunk>,
    /// Ids of chunks left out, in rank order
    pub dropped: Vec<String>,
}

/// Token budget available to the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBudget {
    pub context_window: usize,
    pub max_tokens: usize,
}

impl ContextBudget {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            context_window: config.context_window,
            max_tokens: config.max_tokens as usize,
        }
    }

    /// Tokens the prompt itself may use
    pub const fn prompt_tokens(&self) -> usize {
        self.context_window.saturating_sub(self.max_tokens)
    }

    /// Compose `template` with `question` and as many leading `chunks` as fit.
    ///
    /// When even the best chunk does not fit it is kept anyway; the inference
    /// engine then reports the overflow.
    pub fn fit(
        &self,
        template: &PromptTemplate,
        question: &str,
        chunks: &[ScoredChunk],
    ) -> RagResult<FittedPrompt> {
        let compose = |n: usize| {
            let context = join_chunks(&chunks[..n]);
            template.compose_with(&[("question", question), ("context", context.as_str())])
        };

        let limit = self.prompt_tokens();
        let mut kept = chunks.len().min(1);
        let mut prompt = compose(kept)?;

        for n in 2..=chunks.len() {
            let candidate = compose(n)?;
            if estimate_tokens(candidate.as_str()) > limit {
                break;
            }
            kept = n;
            prompt = candidate;
        }

        let dropped: Vec<String> = chunks[kept..].iter().map(|c| c.chunk.id.clone()).collect();
        if !dropped.is_empty() {
            tracing::warn!(
                kept,
                dropped = ?dropped,
                prompt_tokens = limit,
                "context chunks dropped to fit the context window"
            );
        }

        Ok(FittedPrompt {
            prompt,
            kept: chunks[..kept].to_vec(),
            dropped,
        })
    }
}
