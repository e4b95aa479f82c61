//! Error taxonomy shared across the workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodemapError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("graph consistency violated: {0}")]
    BuilderConsistency(String),

    #[error("llm transport error: {0}")]
    LlmTransport(String),

    #[error("llm refused request: {0}")]
    LlmRefused(String),

    #[error("llm rate limited")]
    LlmQuota,

    #[error("llm authentication failed: {0}")]
    LlmAuth(String),

    #[error("prompt exceeds model context window: {0}")]
    LlmContext(String),
}

impl From<std::io::Error> for CodemapError {
    fn from(e: std::io::Error) -> Self {
        CodemapError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CodemapError {
    fn from(e: serde_json::Error) -> Self {
        CodemapError::Parse(e.to_string())
    }
}

impl CodemapError {
    /// Transient failures are worth retrying; everything else fails fast.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CodemapError::LlmQuota | CodemapError::LlmTransport(_))
    }
}

pub type Result<T> = std::result::Result<T, CodemapError>;
