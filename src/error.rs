//! Error types for the book QA pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing credential, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source file or directory does not exist
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// Embedding/LLM backend call failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Persisted index does not match the corpus it was loaded for
    #[error("Corpus mismatch for '{corpus}': index was built from a different document set (expected fingerprint {expected}, found {found})")]
    CorpusMismatch {
        corpus: String,
        expected: String,
        found: String,
    },

    /// A tool name was registered twice
    #[error("Duplicate tool name: '{0}'")]
    DuplicateTool(String),

    /// Failed to parse a source document
    #[error("Failed to parse '{source_id}': {message}")]
    Parse { source_id: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a parse error
    pub fn parse(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Backend(err.to_string())
    }
}
