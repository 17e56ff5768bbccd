use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::InputArgs;
use crate::cli::output::{create_spinner, hidden_spinner, output, CommandOutput, SpinnerExt};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{Review, ReviewPipeline};

#[derive(Args, Debug, Clone, Default)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Skip the model reachability checks before indexing
    #[arg(long)]
    pub skip_probe: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewOutput {
    pub model: String,
    #[serde(flatten)]
    pub review: Review,
}

impl CommandOutput for ReviewOutput {
    fn to_human(&self) -> String {
        self.review.text.trim_end().to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ReviewArgs, mut config: Config, json_mode: bool) -> Result<()> {
    args.inputs.apply(&mut config);
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let model = config.generation.model_identifier.clone();
    let pipeline =
        ReviewPipeline::from_config(config).context("failed to set up the review pipeline")?;

    if !args.skip_probe {
        pipeline.probe_embedder().await?;
        pipeline.probe_engine().await?;
    }

    let (guideline_index, code_index) = pipeline.build_indices().await?;
    let composed = pipeline.compose(guideline_index, code_index).await?;

    let spinner = if json_mode {
        hidden_spinner()
    } else {
        create_spinner(format!("Generating review with {model}"))
    };

    let review = match pipeline.generate(composed).await {
        Ok(review) => {
            spinner.finish_and_clear();
            review
        }
        Err(err) => {
            spinner.finish_error("Generation failed");
            return Err(err.into());
        }
    };

    output(&ReviewOutput { model, review }, json_mode);
    Ok(())
}
