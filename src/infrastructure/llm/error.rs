use std::time::Duration;
use thiserror::Error;

use crate::domain::errors::RagError;

/// Errors that can occur when talking to a local model server
#[derive(Error, Debug)]
pub enum ServerError {
    /// Connection refused, DNS failure and similar
    #[error("{url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    /// The server does not have the requested model
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The server refused the prompt as too large for its context
    #[error("context exceeded: {0}")]
    ContextExceeded(String),

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The HTTP client gave up waiting
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl ServerError {
    /// Create error from HTTP status code and response body
    ///
    /// - 404: model not found
    /// - 400/413/500 mentioning the context size: context exceeded
    /// - Other: rejected
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let lowered = body.to_lowercase();
        if lowered.contains("context") && (lowered.contains("exceed") || lowered.contains("too long")) {
            return Self::ContextExceeded(body);
        }

        match status.as_u16() {
            404 => Self::ModelNotFound(body),
            code => Self::Rejected { status: code, body },
        }
    }

    /// Classify a transport-level reqwest failure
    pub fn from_reqwest(err: &reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Unreachable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Whether retrying the same request could succeed. Retries are left to
    /// callers; the engine never retries on its own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Timeout(_) | Self::Rejected { status: 500..=599, .. }
        )
    }

    /// Map into the pipeline error vocabulary
    pub fn into_rag_error(self, context_window: usize, max_tokens: usize, estimated_tokens: usize) -> RagError {
        match self {
            Self::Timeout(after) => RagError::Timeout(after),
            Self::ContextExceeded(_) => RagError::PromptTooLong {
                estimated_tokens,
                max_tokens,
                context_window,
            },
            other => RagError::ModelUnavailable(other.to_string()),
        }
    }
}

impl From<ServerError> for RagError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Timeout(after) => Self::Timeout(after),
            other => Self::ModelUnavailable(other.to_string()),
        }
    }
}
