//! Service layer
//!
//! Orchestration on top of the domain ports and infrastructure adapters:
//! retrieval, context budgeting, the generation task boundary and the review
//! pipeline.

pub mod context_budget;
pub mod generation;
pub mod retriever;
pub mod review_pipeline;

pub use context_budget::{ContextBudget, FittedPrompt};
pub use generation::generate_with_timeout;
pub use retriever::Retriever;
pub use review_pipeline::{ComposedReview, IndexPipeline, Review, ReviewPipeline};
