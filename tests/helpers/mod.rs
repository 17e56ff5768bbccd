//! Shared fixtures for integration tests

#![allow(dead_code)]

pub mod pdf;

use rag_review::domain::models::{Config, EmbeddingProvider, InferenceBackend};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const GUIDELINE_RULE: &str = "Use camelCase for variable names.";
pub const CODE_SAMPLE: &str = "fun main() {\n    val snake_case_var = 42\n    println(snake_case_var)\n}\n";

/// A temporary project with a guideline PDF and a source file
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
}

impl Workspace {
    /// Guideline PDF with one page per entry of `guideline_pages`
    pub fn new(guideline_pages: &[&str], code: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let guideline_path = dir.path().join("rules/guidelines.pdf");
        let code_path = dir.path().join("review/code.kt");

        pdf::write_pdf(&guideline_path, guideline_pages);
        write_file(&code_path, code);

        let mut config = Config::default();
        config.inputs.guideline_path = guideline_path;
        config.inputs.code_path = code_path;
        config.index.guideline_dir = dir.path().join("db/guideline_text_db");
        config.index.code_dir = dir.path().join("db/code_text_db");
        config.embedding.provider = EmbeddingProvider::Hashing;

        Self { dir, config }
    }

    /// The camelCase guideline against a snippet that breaks it
    pub fn camel_case() -> Self {
        Self::new(
            &[GUIDELINE_RULE, "Indent blocks with four spaces."],
            CODE_SAMPLE,
        )
    }

    /// A five-page style guide where the camelCase rule shares chunks with its neighbours
    pub fn style_guide() -> Self {
        Self::new(
            &[
                "Indent with four spaces. Keep lines under 100 characters.",
                "Prefer expression bodies for one-line functions. Avoid wildcard imports.",
                GUIDELINE_RULE,
                "Classes use PascalCase names. Keep files small.",
                "Put a blank line between functions. Document public APIs with KDoc comments.",
            ],
            CODE_SAMPLE,
        )
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Point generation at a mock Ollama server
    pub fn with_ollama(mut self, url: &str) -> Self {
        self.config.generation.backend = InferenceBackend::Ollama;
        self.config.generation.base_url = Some(url.to_string());
        self.config.generation.model_identifier = "orca-mini:3b".to_string();
        self
    }
}

pub fn write_file(path: &Path, contents: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(path, contents).expect("failed to write fixture");
    path.to_path_buf()
}

/// Ollama `/api/generate` response body
pub fn ollama_generate_body(text: &str) -> String {
    serde_json::json!({
        "model": "orca-mini:3b",
        "created_at": "2024-01-01T00:00:00Z",
        "response": text,
        "done": true,
        "prompt_eval_count": 120,
        "eval_count": 24
    })
    .to_string()
}
