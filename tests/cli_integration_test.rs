//! CLI integration tests
//!
//! Parse real argument vectors, load configuration files the way the binary
//! does, and dispatch subcommands against temporary workspaces.

mod helpers;

use clap::Parser;
use helpers::{write_file, Workspace};
use rag_review::cli::{self, Cli, Commands};
use rag_review::domain::errors::Stage;
use rag_review::domain::models::{EmbeddingProvider, InferenceBackend};
use rag_review::infrastructure::config::{ConfigError, ConfigLoader};
use rag_review::infrastructure::vector::VectorIndex;

const CONFIG_YAML: &str = r"
inputs:
  guideline_path: docs/style.pdf
  code_path: src/Main.kt
index:
  guideline_dir: cache/rules
  code_dir: cache/code
embedding:
  provider: ollama
  model: nomic-embed-text
  dimensions: 768
generation:
  backend: llama_cpp
  base_url: http://127.0.0.1:8080
  context_window: 4096
retrieval:
  guideline_top_k: 4
";

#[test]
fn test_config_file_selects_backends() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir.path().join("review.yaml"), CONFIG_YAML);

    let config = temp_env::with_vars_unset(["RAG_REVIEW_RETRIEVAL__GUIDELINE_TOP_K"], || {
        ConfigLoader::load_from_file(&path).unwrap()
    });

    assert_eq!(config.embedding.provider, EmbeddingProvider::Ollama);
    assert_eq!(config.embedding.dimensions, 768);
    assert_eq!(config.generation.backend, InferenceBackend::LlamaCpp);
    assert_eq!(config.generation.base_url(), "http://127.0.0.1:8080");
    assert_eq!(config.retrieval.guideline_top_k, 4);
    assert_eq!(config.retrieval.code_top_k, 1);
}

#[test]
fn test_environment_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir.path().join("review.yaml"), CONFIG_YAML);

    let config = temp_env::with_var("RAG_REVIEW_RETRIEVAL__GUIDELINE_TOP_K", Some("2"), || {
        ConfigLoader::load_from_file(&path).unwrap()
    });

    assert_eq!(config.retrieval.guideline_top_k, 2);
}

#[test]
fn test_missing_config_file_is_reported() {
    let result = ConfigLoader::load_from_file("does/not/exist.yaml");
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn test_subcommand_flags_parse() {
    let cli = Cli::try_parse_from([
        "rag-review",
        "review",
        "--guideline",
        "rules/kotlin.pdf",
        "--code",
        "src/App.kt",
        "--reuse-index",
    ])
    .unwrap();

    match cli.command_or_default() {
        Commands::Review(args) => {
            assert_eq!(args.inputs.guideline.unwrap().to_str(), Some("rules/kotlin.pdf"));
            assert_eq!(args.inputs.code.unwrap().to_str(), Some("src/App.kt"));
            assert!(args.inputs.reuse_index);
            assert!(!args.skip_probe);
        }
        other => panic!("expected review, got {other:?}"),
    }
}

#[tokio::test]
async fn test_index_then_query() {
    let workspace = Workspace::camel_case();
    let config = workspace.config.clone();

    let index = Cli::try_parse_from(["rag-review", "--json", "index"]).unwrap();
    cli::dispatch(index.command_or_default(), config.clone(), true)
        .await
        .unwrap();

    assert!(VectorIndex::exists(&config.index.guideline_dir));
    assert!(VectorIndex::exists(&config.index.code_dir));

    let query = Cli::try_parse_from(["rag-review", "query", "guideline", "camelCase", "-k", "1"]).unwrap();
    cli::dispatch(query.command_or_default(), config, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_query_without_index_fails_at_index_stage() {
    let workspace = Workspace::camel_case();

    let query = Cli::try_parse_from(["rag-review", "query", "code", "naming"]).unwrap();
    let err = cli::dispatch(query.command_or_default(), workspace.config.clone(), false)
        .await
        .unwrap_err();

    assert_eq!(cli::failed_stage(&err), Some(Stage::Index));
    assert!(format!("{err:#}").contains("rag-review index"));
}

#[tokio::test]
async fn test_review_with_unreachable_model_fails_at_generate_stage() {
    let mut workspace = Workspace::camel_case().with_ollama("http://127.0.0.1:1");
    workspace.config.generation.timeout_secs = 5;

    let review = Cli::try_parse_from(["rag-review"]).unwrap();
    let err = cli::dispatch(review.command_or_default(), workspace.config.clone(), false)
        .await
        .unwrap_err();

    assert_eq!(cli::failed_stage(&err), Some(Stage::Generate));
}
