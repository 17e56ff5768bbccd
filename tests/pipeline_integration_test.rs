//! End-to-end tests for the review pipeline
//!
//! Guideline PDF + source file → two persisted indices → retrieval → prompt →
//! generation against a mock Ollama server.
//!
//! ## Test Coverage
//! 1. The camelCase guideline reaches the prompt for a snippet that breaks it,
//!    also when the guideline spans several chunks
//! 2. Greedy decoding options are sent and repeated runs are identical
//! 3. Model server failures surface at the generate stage
//! 4. Persisted indices can be reloaded and queried

mod helpers;

use helpers::{ollama_generate_body, Workspace, CODE_SAMPLE, GUIDELINE_RULE};
use mockito::{Matcher, Server};
use rag_review::domain::errors::{RagError, Stage};
use rag_review::infrastructure::ingest::DocumentIngestor;
use rag_review::infrastructure::vector::{create_embedder, VectorIndex};
use rag_review::services::{Retriever, ReviewPipeline};
use std::sync::Arc;

const REVIEW_TEXT: &str = "snake_case_var violates the camelCase rule; rename it to snakeCaseVar.";

#[test]
fn test_guideline_pdf_pages_are_extracted() {
    let workspace = Workspace::camel_case();
    let document = DocumentIngestor::load(&workspace.config.inputs.guideline_path, None).unwrap();

    assert_eq!(document.pages().len(), 2);
    assert_eq!(document.pages()[0].number, 1);
    assert!(document.pages()[0].text.contains(GUIDELINE_RULE));
    assert!(document.pages()[1].text.contains("four spaces"));
}

#[tokio::test]
async fn test_review_end_to_end_with_ollama() {
    let mut server = Server::new_async().await;
    let generate = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(serde_json::json!({
                "model": "orca-mini:3b",
                "stream": false,
                "options": { "temperature": 0.0, "seed": 42 }
            })),
            Matcher::Regex("snake_case_var".to_string()),
            Matcher::Regex("camelCase for variable names".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ollama_generate_body(REVIEW_TEXT))
        .expect(1)
        .create_async()
        .await;

    let workspace = Workspace::camel_case().with_ollama(&server.url());
    let pipeline = ReviewPipeline::from_config(workspace.config.clone()).unwrap();
    let review = pipeline.run().await.unwrap();

    assert_eq!(review.text, REVIEW_TEXT);
    assert!(review.prompt.as_str().contains("snake_case_var"));
    assert!(review.prompt.as_str().contains(GUIDELINE_RULE));
    assert_eq!(review.code_chunks.len(), 1);
    assert!(CODE_SAMPLE.contains(review.code_chunks[0].chunk.content.trim()));
    assert!(review.dropped_chunks.is_empty());

    generate.assert_async().await;
}

#[tokio::test]
async fn test_naming_rule_is_top_chunk_of_multi_chunk_guideline() {
    let workspace = Workspace::style_guide();
    let pipeline = ReviewPipeline::from_config(workspace.config.clone()).unwrap();

    let (guideline, code) = pipeline.build_indices().await.unwrap();
    assert!(guideline.len() > 1);

    let composed = pipeline.compose(guideline, code).await.unwrap();
    assert_eq!(composed.guideline_chunks.len(), 1);
    assert!(composed.guideline_chunks[0].chunk.content.contains(GUIDELINE_RULE));
    assert!(composed.prompt.as_str().contains(GUIDELINE_RULE));
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let mut server = Server::new_async().await;
    let generate = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ollama_generate_body(REVIEW_TEXT))
        .expect(2)
        .create_async()
        .await;

    let workspace = Workspace::camel_case().with_ollama(&server.url());

    let first = ReviewPipeline::from_config(workspace.config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    let second = ReviewPipeline::from_config(workspace.config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(first.prompt, second.prompt);
    assert_eq!(first.text, second.text);
    generate.assert_async().await;
}

#[tokio::test]
async fn test_missing_model_fails_at_generate_stage() {
    let mut server = Server::new_async().await;
    let _generate = server
        .mock("POST", "/api/generate")
        .with_status(404)
        .with_body(r#"{"error":"model 'orca-mini:3b' not found"}"#)
        .create_async()
        .await;

    let workspace = Workspace::camel_case().with_ollama(&server.url());
    let err = ReviewPipeline::from_config(workspace.config.clone())
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Generate);
    assert!(matches!(err.source, RagError::ModelUnavailable(_)));
}

#[tokio::test]
async fn test_probe_reports_model_not_installed() {
    let mut server = Server::new_async().await;
    let _tags = server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"models":[{"name":"llama3:latest"}]}"#)
        .create_async()
        .await;

    let workspace = Workspace::camel_case().with_ollama(&server.url());
    let pipeline = ReviewPipeline::from_config(workspace.config.clone()).unwrap();

    pipeline.probe_embedder().await.unwrap();
    let err = pipeline.probe_engine().await.unwrap_err();
    assert_eq!(err.stage, Stage::Generate);
    assert!(matches!(err.source, RagError::ModelUnavailable(_)));
}

#[tokio::test]
async fn test_persisted_indices_reload_and_answer_queries() {
    let workspace = Workspace::camel_case();
    let config = workspace.config.clone();

    let pipeline = ReviewPipeline::from_config(config.clone()).unwrap();
    let (guideline, _code) = pipeline.build_indices().await.unwrap();

    let reloaded = VectorIndex::load(&config.index.guideline_dir).await.unwrap();
    assert_eq!(reloaded.build_id(), guideline.build_id());
    assert_eq!(reloaded.len(), guideline.len());

    let embedder = create_embedder(&config.embedding).unwrap();
    let retriever = Retriever::new(Arc::new(reloaded), embedder, 1).unwrap();
    let hits = retriever.retrieve("camelCase variable names").await.unwrap();

    assert_eq!(hits.len(), 1);
    assert!(hits[0].chunk.content.contains("camelCase"));
}

#[tokio::test]
async fn test_guideline_and_code_indices_are_independent() {
    let workspace = Workspace::camel_case();
    let config = workspace.config.clone();

    let (guideline, code) = ReviewPipeline::from_config(config.clone())
        .unwrap()
        .build_indices()
        .await
        .unwrap();

    assert_ne!(guideline.build_id(), code.build_id());
    assert!(guideline.entries().iter().all(|e| !e.chunk.content.contains("snake_case_var")));
    assert!(code.entries().iter().all(|e| !e.chunk.content.contains(GUIDELINE_RULE)));
    assert!(workspace.path().join("db/guideline_text_db/index.db").is_file());
    assert!(workspace.path().join("db/code_text_db/index.db").is_file());
}
