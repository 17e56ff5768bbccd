use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::domain::errors::RagError;
use crate::domain::models::config::Config;
use crate::domain::models::PromptTemplate;

/// Directory holding project configuration, relative to the working directory
pub const CONFIG_DIR: &str = ".rag-review";

/// Prefix of environment overrides, e.g. `RAG_REVIEW_RETRIEVAL__GUIDELINE_TOP_K`
pub const ENV_PREFIX: &str = "RAG_REVIEW_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("Invalid chunking config: {0}")]
    InvalidChunking(String),

    #[error("Guideline and code indices must use different directories: {}", .0.display())]
    SharedIndexDir(PathBuf),

    #[error("Invalid {name}: {value}. Must be greater than 0")]
    NotPositive { name: &'static str, value: String },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid {name} template: {reason}")]
    InvalidTemplate { name: &'static str, reason: String },

    #[error("max_tokens ({max_tokens}) must be less than context_window ({context_window})")]
    GenerationBudget {
        max_tokens: u32,
        context_window: usize,
    },
}

impl From<ConfigError> for RagError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .rag-review/config.yaml (project config)
    /// 3. .rag-review/local.yaml (local overrides, optional)
    /// 4. Environment variables (RAG_REVIEW_* prefix, `__` separates nesting)
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from_dir(Path::new(CONFIG_DIR))
    }

    /// [`ConfigLoader::load`] with the project config directory given explicitly
    pub fn load_from_dir(dir: &Path) -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment variables still
    /// take precedence
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        config
            .chunking
            .validate()
            .map_err(ConfigError::InvalidChunking)?;

        if normalize_dir(&config.index.guideline_dir) == normalize_dir(&config.index.code_dir) {
            return Err(ConfigError::SharedIndexDir(config.index.guideline_dir.clone()));
        }

        positive("retrieval.guideline_top_k", config.retrieval.guideline_top_k)?;
        positive("retrieval.code_top_k", config.retrieval.code_top_k)?;
        positive("embedding.dimensions", config.embedding.dimensions)?;
        positive("embedding.timeout_secs", config.embedding.timeout_secs)?;
        positive("generation.max_tokens", config.generation.max_tokens)?;
        positive("generation.timeout_secs", config.generation.timeout_secs)?;

        if config.generation.max_tokens as usize >= config.generation.context_window {
            return Err(ConfigError::GenerationBudget {
                max_tokens: config.generation.max_tokens,
                context_window: config.generation.context_window,
            });
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        PromptTemplate::requiring(config.prompt.review_template.as_str(), &["question", "context"])
            .map_err(|e| ConfigError::InvalidTemplate {
                name: "review",
                reason: e.to_string(),
            })?;
        PromptTemplate::requiring(config.prompt.question_template.as_str(), &["code"]).map_err(
            |e| ConfigError::InvalidTemplate {
                name: "question",
                reason: e.to_string(),
            },
        )?;

        Ok(())
    }
}

/// Absolute, lexically normalized form of `path` (`.` dropped, `..` applied)
fn normalize_dir(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn positive<T>(name: &'static str, value: T) -> Result<(), ConfigError>
where
    T: Default + PartialEq + ToString,
{
    if value == T::default() {
        return Err(ConfigError::NotPositive {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}
