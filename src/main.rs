//! rag-review CLI entry point.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use rag_review::cli::{self, Cli};
use rag_review::domain::models::Config;
use rag_review::infrastructure::config::ConfigLoader;
use rag_review::infrastructure::logging::{LogConfig, LoggerImpl};

/// Conventional exit status for SIGINT
const EXIT_INTERRUPTED: u8 = 130;

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => ConfigLoader::load().context("failed to load configuration"),
    }
}

fn init_logging(config: &Config) -> anyhow::Result<LoggerImpl> {
    let log_config = LogConfig::try_from(&config.logging).context("invalid logging configuration")?;
    LoggerImpl::init(&log_config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = cli.json;

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            cli::handle_error(&err, json_mode);
            return ExitCode::FAILURE;
        }
    };

    // Held until exit so the file writer flushes
    let _logger = match init_logging(&config) {
        Ok(logger) => logger,
        Err(err) => {
            cli::handle_error(&err, json_mode);
            return ExitCode::FAILURE;
        }
    };

    // Dropping the command future on Ctrl-C aborts any in-flight model request
    tokio::select! {
        result = cli::dispatch(cli.command_or_default(), config, json_mode) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                cli::handle_error(&err, json_mode);
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted");
            eprintln!("Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}
