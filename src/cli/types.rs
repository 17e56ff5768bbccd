//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::index::IndexArgs;
use super::commands::query::QueryArgs;
use super::commands::review::ReviewArgs;

#[derive(Parser, Debug)]
#[command(name = "rag-review")]
#[command(about = "Review source code against a style guideline with a local LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Defaults to `review`
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (replaces .rag-review/config.yaml and local.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The subcommand to run, `review` when none was given
    pub fn command_or_default(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Review(ReviewArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Index both documents, retrieve context and generate a review
    Review(ReviewArgs),

    /// Build and persist the guideline and code indices only
    Index(IndexArgs),

    /// Look up the closest chunks in a persisted index
    Query(QueryArgs),
}
