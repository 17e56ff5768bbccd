//! Retrieval-augmented style review
//!
//! Orchestrates the two index pipelines (guideline and code), retrieval,
//! prompt composition and generation. The index pipelines are independent and
//! run concurrently; everything after them is sequential.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

use super::context_budget::ContextBudget;
use super::generation::generate_with_timeout;
use super::retriever::Retriever;
use crate::domain::errors::{Stage, StageError, StageExt};
use crate::domain::models::{join_chunks, Config, IndexEntry, Prompt, PromptTemplate, ScoredChunk};
use crate::domain::ports::{Embedder, InferenceEngine};
use crate::infrastructure::ingest::DocumentIngestor;
use crate::infrastructure::llm::create_engine;
use crate::infrastructure::vector::{create_embedder, Chunker, VectorIndex};

/// Builds (or reuses) one vector index from one source document
#[derive(Debug, Clone)]
pub struct IndexPipeline {
    source: PathBuf,
    location: PathBuf,
    reuse_existing: bool,
}

impl IndexPipeline {
    pub fn new(source: impl Into<PathBuf>, location: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            location: location.into(),
            reuse_existing: false,
        }
    }

    /// Load the persisted index instead of rebuilding when one exists
    #[must_use]
    pub fn reuse_existing(mut self, reuse: bool) -> Self {
        self.reuse_existing = reuse;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Ingest, chunk, embed and persist
    #[instrument(skip(self, chunker, embedder), fields(source = %self.source.display()))]
    pub async fn run(
        &self,
        chunker: &Chunker,
        embedder: &dyn Embedder,
    ) -> Result<Arc<VectorIndex>, StageError> {
        if self.reuse_existing && VectorIndex::exists(&self.location) {
            let index = VectorIndex::load(&self.location).await.at(Stage::Index)?;
            return Ok(Arc::new(index));
        }

        let document = DocumentIngestor::load_async(&self.source, None)
            .await
            .at(Stage::Ingest)?;

        let chunks = chunker.split_document(&document);
        if chunks.is_empty() {
            tracing::warn!(source = %self.source.display(), "document has no text to index");
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embedder.embed_all(&texts).await.at(Stage::Embed)?;

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry::new(chunk, embedding))
            .collect();

        let index = VectorIndex::build(&self.location, embedder.model().clone(), entries)
            .await
            .at(Stage::Index)?;

        Ok(Arc::new(index))
    }
}

/// Outcome of a review run
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    /// Generated review text (may be empty)
    pub text: String,
    /// The exact prompt sent to the model
    pub prompt: Prompt,
    pub code_chunks: Vec<ScoredChunk>,
    /// Guideline chunks placed in the prompt context
    pub guideline_chunks: Vec<ScoredChunk>,
    /// Guideline chunk ids left out to fit the context window
    pub dropped_chunks: Vec<String>,
}

/// A composed prompt and the retrieval that produced it
#[derive(Debug, Clone)]
pub struct ComposedReview {
    pub prompt: Prompt,
    pub code_chunks: Vec<ScoredChunk>,
    pub guideline_chunks: Vec<ScoredChunk>,
    pub dropped_chunks: Vec<String>,
}

/// The full review pipeline with its handles constructed once
pub struct ReviewPipeline {
    config: Config,
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    engine: Arc<dyn InferenceEngine>,
    review_template: PromptTemplate,
    question_template: PromptTemplate,
}

impl ReviewPipeline {
    /// Create a pipeline with explicit embedder and engine
    ///
    /// Chunking settings are rejected at the chunk stage, prompt templates at
    /// the compose stage.
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        engine: Arc<dyn InferenceEngine>,
    ) -> Result<Self, StageError> {
        let chunker = Chunker::with_config(config.chunking.clone()).at(Stage::Chunk)?;
        let review_template = PromptTemplate::requiring(
            config.prompt.review_template.as_str(),
            &["question", "context"],
        )
        .at(Stage::Compose)?;
        let question_template =
            PromptTemplate::requiring(config.prompt.question_template.as_str(), &["code"])
                .at(Stage::Compose)?;

        Ok(Self {
            config,
            chunker,
            embedder,
            engine,
            review_template,
            question_template,
        })
    }

    /// Create a pipeline with the configured embedder and engine
    pub fn from_config(config: Config) -> Result<Self, StageError> {
        let embedder = create_embedder(&config.embedding).at(Stage::Embed)?;
        let engine = create_engine(&config.generation).at(Stage::Generate)?;
        Self::new(config, embedder, engine)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Check that the embedding backend is reachable
    pub async fn probe_embedder(&self) -> Result<(), StageError> {
        self.embedder.probe().await.at(Stage::Embed)
    }

    /// Check that the generative model is reachable
    pub async fn probe_engine(&self) -> Result<(), StageError> {
        self.engine.probe(&self.config.generation).await.at(Stage::Generate)
    }

    pub fn guideline_pipeline(&self) -> IndexPipeline {
        IndexPipeline::new(
            &self.config.inputs.guideline_path,
            &self.config.index.guideline_dir,
        )
        .reuse_existing(self.config.index.reuse_existing)
    }

    pub fn code_pipeline(&self) -> IndexPipeline {
        IndexPipeline::new(&self.config.inputs.code_path, &self.config.index.code_dir)
            .reuse_existing(self.config.index.reuse_existing)
    }

    /// Build both indices concurrently. Returns `(guideline, code)`.
    pub async fn build_indices(&self) -> Result<(Arc<VectorIndex>, Arc<VectorIndex>), StageError> {
        let guideline = self.guideline_pipeline();
        let code = self.code_pipeline();

        let (guideline_index, code_index) = tokio::try_join!(
            guideline.run(&self.chunker, self.embedder.as_ref()),
            code.run(&self.chunker, self.embedder.as_ref()),
        )?;

        info!(
            guideline_entries = guideline_index.len(),
            code_entries = code_index.len(),
            "indices ready"
        );

        Ok((guideline_index, code_index))
    }

    /// Retrieve from both indices and compose the review prompt
    pub async fn compose(
        &self,
        guideline_index: Arc<VectorIndex>,
        code_index: Arc<VectorIndex>,
    ) -> Result<ComposedReview, StageError> {
        let retrieval = &self.config.retrieval;

        let code_retriever = Retriever::new(code_index, Arc::clone(&self.embedder), retrieval.code_top_k)
            .at(Stage::Retrieve)?;
        let guideline_retriever = Retriever::new(
            guideline_index,
            Arc::clone(&self.embedder),
            retrieval.guideline_top_k,
        )
        .at(Stage::Retrieve)?;

        let code_chunks = code_retriever
            .retrieve(&retrieval.review_focus)
            .await
            .at(Stage::Retrieve)?;
        let code = join_chunks(&code_chunks);

        // The retrieved code is the guideline query
        let guideline_chunks = guideline_retriever.retrieve(&code).await.at(Stage::Retrieve)?;

        let question = self
            .question_template
            .compose_with(&[("code", code.as_str())])
            .at(Stage::Compose)?;

        let fitted = ContextBudget::from_config(&self.config.generation)
            .fit(&self.review_template, question.as_str(), &guideline_chunks)
            .at(Stage::Compose)?;

        info!(
            prompt_chars = fitted.prompt.len(),
            guideline_chunks = fitted.kept.len(),
            dropped = fitted.dropped.len(),
            "prompt composed"
        );

        Ok(ComposedReview {
            prompt: fitted.prompt,
            code_chunks,
            guideline_chunks: fitted.kept,
            dropped_chunks: fitted.dropped,
        })
    }

    /// Send a composed prompt to the model, bounded by the generation timeout
    pub async fn generate(&self, composed: ComposedReview) -> Result<Review, StageError> {
        let text = generate_with_timeout(
            Arc::clone(&self.engine),
            composed.prompt.clone(),
            self.config.generation.clone(),
        )
        .await
        .at(Stage::Generate)?;

        if text.trim().is_empty() {
            tracing::warn!("model returned an empty review");
        }

        Ok(Review {
            text,
            prompt: composed.prompt,
            code_chunks: composed.code_chunks,
            guideline_chunks: composed.guideline_chunks,
            dropped_chunks: composed.dropped_chunks,
        })
    }

    /// Run the whole review: index, retrieve, compose, generate
    pub async fn run(&self) -> Result<Review, StageError> {
        let (guideline_index, code_index) = self.build_indices().await?;
        let composed = self.compose(guideline_index, code_index).await?;
        self.generate(composed).await
    }
}
