use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use super::InputArgs;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::vector::VectorIndex;
use crate::services::ReviewPipeline;

#[derive(Args, Debug, Clone, Default)]
pub struct IndexArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// What was persisted for one index
#[derive(Debug, Serialize)]
pub struct IndexSummary {
    pub name: String,
    pub location: PathBuf,
    pub entries: usize,
    pub model: String,
    pub dimensions: usize,
    pub build_id: Uuid,
    pub built_at: DateTime<Utc>,
}

impl From<&VectorIndex> for IndexSummary {
    fn from(index: &VectorIndex) -> Self {
        Self {
            name: index.name().to_string(),
            location: index.location().to_path_buf(),
            entries: index.len(),
            model: index.model().to_string(),
            dimensions: index.model().dimensions,
            build_id: index.build_id(),
            built_at: index.built_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexOutput {
    pub guideline: IndexSummary,
    pub code: IndexSummary,
}

impl CommandOutput for IndexOutput {
    fn to_human(&self) -> String {
        [&self.guideline, &self.code]
            .iter()
            .map(|s| {
                format!(
                    "{}: {} chunks at {} ({}, built {})",
                    s.name,
                    s.entries,
                    s.location.display(),
                    s.model,
                    s.built_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: IndexArgs, mut config: Config, json_mode: bool) -> Result<()> {
    args.inputs.apply(&mut config);
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let pipeline =
        ReviewPipeline::from_config(config).context("failed to set up the index pipeline")?;
    pipeline.probe_embedder().await?;

    let (guideline, code) = pipeline.build_indices().await?;

    output(
        &IndexOutput {
            guideline: IndexSummary::from(guideline.as_ref()),
            code: IndexSummary::from(code.as_ref()),
        },
        json_mode,
    );
    Ok(())
}
