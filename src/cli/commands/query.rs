use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::errors::{Stage, StageExt};
use crate::domain::models::{Config, ScoredChunk};
use crate::infrastructure::vector::{create_embedder, VectorIndex};
use crate::services::Retriever;

const PREVIEW_CHARS: usize = 160;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Guideline,
    Code,
}

impl IndexKind {
    fn location(self, config: &Config) -> PathBuf {
        match self {
            Self::Guideline => config.index.guideline_dir.clone(),
            Self::Code => config.index.code_dir.clone(),
        }
    }

    const fn default_k(self, config: &Config) -> usize {
        match self {
            Self::Guideline => config.retrieval.guideline_top_k,
            Self::Code => config.retrieval.code_top_k,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Which persisted index to search
    #[arg(value_enum)]
    pub index: IndexKind,

    /// Query text
    pub text: String,

    /// Number of chunks to return (defaults to the configured top-k)
    #[arg(short, long)]
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub index: IndexKind,
    pub location: PathBuf,
    pub query: String,
    pub results: Vec<ScoredChunk>,
}

impl CommandOutput for QueryOutput {
    fn to_human(&self) -> String {
        if self.results.is_empty() {
            return "No matching chunks.".to_string();
        }

        self.results
            .iter()
            .enumerate()
            .map(|(rank, hit)| {
                let preview = hit.chunk.content.replace('\n', " ");
                format!(
                    "{}. [{:.3}] {}\n   {}",
                    rank + 1,
                    hit.score,
                    hit.chunk.id,
                    truncate(preview.trim(), PREVIEW_CHARS)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: QueryArgs, config: Config, json_mode: bool) -> Result<()> {
    let location = args.index.location(&config);
    let k = args.k.unwrap_or_else(|| args.index.default_k(&config));

    let index = VectorIndex::load(&location)
        .await
        .at(Stage::Index)
        .with_context(|| format!("no usable index at {}; run `rag-review index` first", location.display()))?;

    let embedder = create_embedder(&config.embedding).context("failed to set up the embedder")?;
    let retriever = Retriever::new(Arc::new(index), embedder, k).at(Stage::Retrieve)?;
    let results = retriever.retrieve(&args.text).await.at(Stage::Retrieve)?;

    output(
        &QueryOutput {
            index: args.index,
            location,
            query: args.text,
            results,
        },
        json_mode,
    );
    Ok(())
}
