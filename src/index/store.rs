//! Persisted index store
//!
//! One subdirectory per corpus under the storage root, holding
//! `manifest.json` (corpus identity and fingerprint) and `chunks.json`
//! (embedded chunks). The store prefers loading over rebuilding so the
//! embedding cost is paid once per corpus.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ingestion::TextChunker;
use crate::providers::EmbeddingProvider;
use crate::types::{corpus_fingerprint, Chunk, Document};

use super::vector_index::VectorIndex;

const MANIFEST_FILE: &str = "manifest.json";
const CHUNKS_FILE: &str = "chunks.json";

/// Identity of a persisted index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Corpus name (one book)
    pub corpus: String,
    /// SHA-256 fingerprint of the source documents
    pub fingerprint: String,
    /// Embedding model the chunks were embedded with
    pub embedding_model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Number of persisted chunks
    pub chunk_count: usize,
    /// Build timestamp
    pub created_at: DateTime<Utc>,
}

/// Builder/loader for persisted per-corpus indexes
pub struct IndexStore {
    root: PathBuf,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    embedding_model: String,
}

impl IndexStore {
    /// Create a store rooted at the configured storage directory
    pub fn new(config: &Config, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            root: config.storage_dir.clone(),
            chunker: TextChunker::new(&config.chunking),
            embedder,
            embedding_model: config.embeddings.model.clone(),
        }
    }

    /// Directory holding one corpus's persisted index
    pub fn corpus_dir(&self, corpus: &str) -> PathBuf {
        self.root.join(corpus)
    }

    /// Whether a persisted index exists for the corpus
    pub fn is_persisted(&self, corpus: &str) -> bool {
        self.corpus_dir(corpus).join(MANIFEST_FILE).exists()
    }

    /// Load when persisted, otherwise build from the documents and persist.
    ///
    /// A loaded index is verified against the supplied documents; a
    /// fingerprint or embedding-model mismatch is an error rather than a
    /// silently wrong corpus.
    pub async fn open_or_build(&self, corpus: &str, docs: &[Document]) -> Result<VectorIndex> {
        if self.is_persisted(corpus) {
            tracing::info!(corpus, "loading persisted index");
            let index = self.load(corpus)?;
            self.verify(corpus, index.manifest(), docs)?;
            return Ok(index);
        }
        tracing::info!(corpus, documents = docs.len(), "building index");
        self.build(corpus, docs).await
    }

    /// Chunk, embed, persist, and return a fresh index.
    pub async fn build(&self, corpus: &str, docs: &[Document]) -> Result<VectorIndex> {
        let mut chunks = self.chunker.chunk_corpus(docs);
        self.embed_chunks(&mut chunks).await?;

        let manifest = IndexManifest {
            corpus: corpus.to_string(),
            fingerprint: corpus_fingerprint(docs),
            embedding_model: self.embedding_model.clone(),
            dimensions: self.embedder.dimensions(),
            chunk_count: chunks.len(),
            created_at: Utc::now(),
        };

        self.persist(&manifest, &chunks)?;
        tracing::info!(corpus, chunks = chunks.len(), "index persisted");
        VectorIndex::new(manifest, chunks)
    }

    /// Restore a persisted index without touching the embedder.
    pub fn load(&self, corpus: &str) -> Result<VectorIndex> {
        let dir = self.corpus_dir(corpus);
        let manifest: IndexManifest = read_json(&dir.join(MANIFEST_FILE))?;
        let chunks: Vec<Chunk> = read_json(&dir.join(CHUNKS_FILE))?;
        VectorIndex::new(manifest, chunks)
    }

    /// Delete a persisted index. Corpus changes require an explicit
    /// invalidate-and-rebuild; there is no incremental update.
    pub fn invalidate(&self, corpus: &str) -> Result<()> {
        let dir = self.corpus_dir(corpus);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    fn verify(&self, corpus: &str, manifest: &IndexManifest, docs: &[Document]) -> Result<()> {
        if manifest.embedding_model != self.embedding_model
            || manifest.dimensions != self.embedder.dimensions()
        {
            return Err(Error::CorpusMismatch {
                corpus: corpus.to_string(),
                expected: format!("{}/{}", self.embedding_model, self.embedder.dimensions()),
                found: format!("{}/{}", manifest.embedding_model, manifest.dimensions),
            });
        }
        let fingerprint = corpus_fingerprint(docs);
        if fingerprint != manifest.fingerprint {
            return Err(Error::CorpusMismatch {
                corpus: corpus.to_string(),
                expected: fingerprint,
                found: manifest.fingerprint.clone(),
            });
        }
        Ok(())
    }

    async fn embed_chunks(&self, chunks: &mut [Chunk]) -> Result<()> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::backend(format!(
                "embedded {} of {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }
        Ok(())
    }

    fn persist(&self, manifest: &IndexManifest, chunks: &[Chunk]) -> Result<()> {
        let dir = self.corpus_dir(&manifest.corpus);
        std::fs::create_dir_all(&dir)?;
        write_json(&dir.join(MANIFEST_FILE), manifest)?;
        write_json(&dir.join(CHUNKS_FILE), &chunks)?;
        Ok(())
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    std::fs::write(path, raw)?;
    Ok(())
}
