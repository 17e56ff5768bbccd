//! Command-line interface

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use crate::domain::errors::{Stage, StageError};
use crate::domain::models::Config;

/// Run one subcommand against a loaded configuration
pub async fn dispatch(command: Commands, config: Config, json_mode: bool) -> anyhow::Result<()> {
    match command {
        Commands::Review(args) => commands::review::execute(args, config, json_mode).await,
        Commands::Index(args) => commands::index::execute(args, config, json_mode).await,
        Commands::Query(args) => commands::query::execute(args, config, json_mode).await,
    }
}

fn stage_error(err: &anyhow::Error) -> Option<&StageError> {
    err.chain().find_map(|cause| cause.downcast_ref::<StageError>())
}

/// The pipeline stage an error came from, if any
pub fn failed_stage(err: &anyhow::Error) -> Option<Stage> {
    stage_error(err).map(|staged| staged.stage)
}

/// Report an error chain on stderr
pub fn handle_error(err: &anyhow::Error, json_mode: bool) {
    tracing::error!(error = %format!("{err:#}"), "command failed");

    if json_mode {
        let body = serde_json::json!({
            "error": format!("{err:#}"),
            "stage": failed_stage(err).map(|stage| stage.to_string()),
            "kind": stage_error(err).map(|staged| staged.source.kind()),
        });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{RagError, StageExt};
    use anyhow::Context;

    #[test]
    fn test_failed_stage_found_through_context() {
        let result: Result<(), RagError> = Err(RagError::EmptyIndex);
        let err = result
            .at(Stage::Retrieve)
            .context("review failed")
            .unwrap_err();

        assert_eq!(failed_stage(&err), Some(Stage::Retrieve));
        assert!(format!("{err:#}").contains("retrieve stage failed"));
    }

    #[test]
    fn test_failed_stage_absent_for_plain_errors() {
        let err = anyhow::anyhow!("bad config");
        assert_eq!(failed_stage(&err), None);
    }
}
