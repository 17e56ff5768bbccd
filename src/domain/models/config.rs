use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::chunking::ChunkingConfig;
use super::embedding::EmbeddingConfig;
use super::inference::ModelConfig;

/// Main configuration structure for rag-review
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Documents to review
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Where the two vector indices live
    #[serde(default)]
    pub index: IndexConfig,

    /// Chunking parameters (shared by both indices)
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding backend
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Retrieval parameters
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Generative model settings
    #[serde(default)]
    pub generation: ModelConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input document locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InputsConfig {
    /// Paginated style guideline (PDF)
    #[serde(default = "default_guideline_path")]
    pub guideline_path: PathBuf,

    /// Source file under review
    #[serde(default = "default_code_path")]
    pub code_path: PathBuf,
}

fn default_guideline_path() -> PathBuf {
    PathBuf::from("rules/guidelines.pdf")
}

fn default_code_path() -> PathBuf {
    PathBuf::from("review/code.kt")
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            guideline_path: default_guideline_path(),
            code_path: default_code_path(),
        }
    }
}

/// Vector index storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndexConfig {
    /// Directory of the guideline index
    #[serde(default = "default_guideline_dir")]
    pub guideline_dir: PathBuf,

    /// Directory of the code index
    #[serde(default = "default_code_dir")]
    pub code_dir: PathBuf,

    /// Load an existing index instead of rebuilding it
    #[serde(default)]
    pub reuse_existing: bool,
}

fn default_guideline_dir() -> PathBuf {
    PathBuf::from("./db/guideline_text_db")
}

fn default_code_dir() -> PathBuf {
    PathBuf::from("./db/code_text_db")
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            guideline_dir: default_guideline_dir(),
            code_dir: default_code_dir(),
            reuse_existing: false,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// Guideline chunks placed in the prompt context
    #[serde(default = "default_top_k")]
    pub guideline_top_k: usize,

    /// Code chunks placed in the question
    #[serde(default = "default_top_k")]
    pub code_top_k: usize,

    /// Query used to pick the code chunks under review
    #[serde(default = "default_review_focus")]
    pub review_focus: String,
}

const fn default_top_k() -> usize {
    1
}

fn default_review_focus() -> String {
    "variable names, naming conventions, formatting and code style".to_string()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            guideline_top_k: default_top_k(),
            code_top_k: default_top_k(),
            review_focus: default_review_focus(),
        }
    }
}

/// Prompt templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PromptConfig {
    /// Final prompt; must contain `{question}` and `{context}`
    #[serde(default = "default_review_template")]
    pub review_template: String,

    /// Question built from the retrieved code; must contain `{code}`
    #[serde(default = "default_question_template")]
    pub question_template: String,
}

pub const DEFAULT_REVIEW_TEMPLATE: &str = "You are a senior developer reviewing a pull request. \
You are given code style guidelines in the context.

Check whether the given code follows every guideline provided. If it does not, suggest concrete \
code changes, name the guideline each suggestion is based on and show a short example. If the \
code follows the guidelines, say that the code is following the coding style guidelines.

Finally list suggestions for improving code quality and performance, highest priority first, \
each one concise. If you have no suggestions, say: Code looks good.

Question: {question}

Context: {context}

Answer:";

pub const DEFAULT_QUESTION_TEMPLATE: &str =
    "Give suggestions for improving the following code according to the coding style guidelines:\n{code}";

fn default_review_template() -> String {
    DEFAULT_REVIEW_TEMPLATE.to_string()
}

fn default_question_template() -> String {
    DEFAULT_QUESTION_TEMPLATE.to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            review_template: default_review_template(),
            question_template: default_question_template(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r"
inputs:
  code_path: src/Main.kt
retrieval:
  guideline_top_k: 3
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.inputs.code_path, PathBuf::from("src/Main.kt"));
        assert_eq!(config.inputs.guideline_path, PathBuf::from("rules/guidelines.pdf"));
        assert_eq!(config.retrieval.guideline_top_k, 3);
        assert_eq!(config.retrieval.code_top_k, 1);
        assert_eq!(config.chunking.chunk_size, 100);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_default_templates_have_placeholders() {
        let config = PromptConfig::default();
        assert!(config.review_template.contains("{question}"));
        assert!(config.review_template.contains("{context}"));
        assert!(config.question_template.contains("{code}"));
    }
}
