//! Domain errors for the review pipeline.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur anywhere in the retrieval and generation pipeline.
///
/// Every variant indicates a configuration or environment defect; none of them
/// are recovered from internally.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Index is empty")]
    EmptyIndex,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Missing prompt field: {0}")]
    MissingField(String),

    #[error("Prompt too long: ~{estimated_tokens} tokens + {max_tokens} to generate exceeds context window of {context_window}")]
    PromptTooLong {
        estimated_tokens: usize,
        max_tokens: usize,
        context_window: usize,
    },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Index at {} is incomplete or corrupt: {reason}", path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("Index storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Dimension mismatch between two vector lengths.
    pub fn dimensions(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Short, stable name of the error kind (used in JSON output and logs).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Parse { .. } => "parse",
            Self::Config(_) => "config",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::EmptyIndex => "empty_index",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::MissingField(_) => "missing_field",
            Self::PromptTooLong { .. } => "prompt_too_long",
            Self::Timeout(_) => "timeout",
            Self::CorruptIndex { .. } => "corrupt_index",
            Self::Storage(_) => "storage",
            Self::Io(_) => "io",
        }
    }
}

pub type RagResult<T> = Result<T, RagError>;

impl From<sqlx::Error> for RagError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for RagError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("serialization: {err}"))
    }
}

/// Pipeline stage an error surfaced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Chunk,
    Embed,
    Index,
    Retrieve,
    Compose,
    Generate,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ingest => "ingest",
            Self::Chunk => "chunk",
            Self::Embed => "embed",
            Self::Index => "index",
            Self::Retrieve => "retrieve",
            Self::Compose => "compose",
            Self::Generate => "generate",
        };
        f.write_str(name)
    }
}

/// A [`RagError`] tagged with the stage that produced it. The inner error is
/// passed through untouched.
#[derive(Debug, Error)]
#[error("{stage} stage failed")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: RagError,
}

impl StageError {
    pub fn new(stage: Stage, source: RagError) -> Self {
        Self { stage, source }
    }
}

/// Attach a [`Stage`] to a `RagResult`.
pub trait StageExt<T> {
    fn at(self, stage: Stage) -> Result<T, StageError>;
}

impl<T> StageExt<T> for RagResult<T> {
    fn at(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|e| StageError::new(stage, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_keeps_kind() {
        let err: RagResult<()> = Err(RagError::EmptyIndex);
        let staged = err.at(Stage::Retrieve).unwrap_err();

        assert_eq!(staged.stage, Stage::Retrieve);
        assert!(matches!(staged.source, RagError::EmptyIndex));
        assert_eq!(staged.to_string(), "retrieve stage failed");
        assert_eq!(
            std::error::Error::source(&staged).map(ToString::to_string),
            Some("Index is empty".to_string())
        );
    }

    #[test]
    fn test_dimension_helper() {
        let err = RagError::dimensions(384, 768);
        assert_eq!(err.kind(), "dimension_mismatch");
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 768");
    }

    #[test]
    fn test_not_found_message_names_path() {
        let err = RagError::NotFound(PathBuf::from("rules/missing.pdf"));
        assert!(err.to_string().contains("rules/missing.pdf"));
    }
}
