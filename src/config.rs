//! Configuration for the book QA pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding the backend credential
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Main pipeline configuration
///
/// Constructed once and passed explicitly into each component; no component
/// reads the environment on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend credential (never serialized back out)
    #[serde(skip)]
    pub api_key: String,
    /// Book sources directory
    #[serde(default = "default_books_dir")]
    pub books_dir: PathBuf,
    /// Persisted index storage directory (one subdirectory per corpus)
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// LLM backend configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            books_dir: default_books_dir(),
            storage_dir: default_storage_dir(),
            llm: LlmConfig::default(),
            embeddings: EmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

fn default_books_dir() -> PathBuf {
    PathBuf::from("books")
}

fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bookqa")
        .join("indexes")
}

impl Config {
    /// Build configuration from the environment.
    ///
    /// Fails before any file or network I/O when the credential is absent.
    pub fn from_env() -> Result<Self> {
        let api_key = read_api_key()?;
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }

    /// Build configuration from a TOML file, with the credential taken from
    /// the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let api_key = read_api_key()?;
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config: Config = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("invalid config {}: {}", path.display(), e)))?;
        config.api_key = api_key;
        Ok(config)
    }

    /// Load `bookqa.toml` from the working directory when present, otherwise
    /// fall back to defaults. The credential is always required.
    pub fn load() -> Result<Self> {
        let path = Path::new("bookqa.toml");
        if path.exists() {
            Self::from_file(path)
        } else {
            Self::from_env()
        }
    }
}

fn read_api_key() -> Result<String> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(Error::config(format!(
            "{} is not set; the LLM backend credential is required",
            API_KEY_VAR
        ))),
    }
}

/// LLM backend configuration (OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Chat completion model
    pub chat_model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Batch size for embedding requests
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 32,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size (smaller chunks are skipped)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 200,
            min_chunk_size: 50,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per question
    pub top_k: usize,
    /// Minimum cosine similarity for a chunk to be used
    pub similarity_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.2,
        }
    }
}
