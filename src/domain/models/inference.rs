//! Inference domain models

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Local model servers the inference engine can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceBackend {
    /// Ollama (`POST /api/generate`)
    Ollama,
    /// llama.cpp server (`POST /completion`)
    LlamaCpp,
}

impl InferenceBackend {
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::LlamaCpp => "http://localhost:8080",
        }
    }
}

impl std::fmt::Display for InferenceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::LlamaCpp => write!(f, "llama_cpp"),
        }
    }
}

/// Generation settings passed with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// Model name or file the server should use
    #[serde(default = "default_model_identifier")]
    pub model_identifier: String,

    #[serde(default = "default_backend")]
    pub backend: InferenceBackend,

    /// Server URL; the backend's default when unset
    #[serde(default)]
    pub base_url: Option<String>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: f32,

    /// Sampling seed; with temperature 0 makes output reproducible
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,

    /// Model context window in tokens
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Upper bound for a single generation, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model_identifier() -> String {
    "orca-mini:3b".to_string()
}

const fn default_backend() -> InferenceBackend {
    InferenceBackend::Ollama
}

const fn default_max_tokens() -> u32 {
    512
}

#[allow(clippy::unnecessary_wraps)]
const fn default_seed() -> Option<u64> {
    Some(42)
}

const fn default_context_window() -> usize {
    2048
}

const fn default_timeout_secs() -> u64 {
    300
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_identifier: default_model_identifier(),
            backend: default_backend(),
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            seed: default_seed(),
            context_window: default_context_window(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_base_url())
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
