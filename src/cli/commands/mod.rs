//! Subcommand implementations

pub mod index;
pub mod query;
pub mod review;

use clap::Args;
use std::path::PathBuf;

use crate::domain::models::Config;

/// Input overrides shared by `review` and `index`
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Guideline document (PDF or plain text)
    #[arg(long, value_name = "PATH")]
    pub guideline: Option<PathBuf>,

    /// Source file to review
    #[arg(long, value_name = "PATH")]
    pub code: Option<PathBuf>,

    /// Load persisted indices instead of rebuilding them
    #[arg(long)]
    pub reuse_index: bool,
}

impl InputArgs {
    /// Apply the overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref guideline) = self.guideline {
            config.inputs.guideline_path.clone_from(guideline);
        }
        if let Some(ref code) = self.code {
            config.inputs.code_path.clone_from(code);
        }
        if self.reuse_index {
            config.index.reuse_existing = true;
        }
    }
}
