//! In-memory vector index with exhaustive cosine search
//!
//! A corpus is a few hundred chunks at most, so search is a straight scan.
//! Nearest-neighbor structures stay out of scope.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::store::IndexManifest;
use crate::types::Chunk;

/// Search hit: a chunk and its similarity to the query
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity (0.0-1.0, higher is better)
    pub similarity: f32,
}

/// Read-only index over one corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    manifest: IndexManifest,
    chunks: Vec<Chunk>,
}

impl VectorIndex {
    /// Assemble an index from embedded chunks
    pub fn new(manifest: IndexManifest, chunks: Vec<Chunk>) -> Result<Self> {
        for chunk in &chunks {
            if chunk.embedding.len() != manifest.dimensions {
                return Err(Error::internal(format!(
                    "chunk {} has {} dimensions, index expects {}",
                    chunk.id,
                    chunk.embedding.len(),
                    manifest.dimensions
                )));
            }
        }
        Ok(Self { manifest, chunks })
    }

    /// Index manifest (corpus identity, fingerprint, embedding model)
    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    /// All chunks, in insertion order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top-k chunks by cosine similarity to the query embedding, filtered by
    /// the similarity threshold.
    pub fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Vec<ScoredChunk> {
        let query_norm = l2_norm(query);
        if query_norm == 0.0 {
            return Vec::new();
        }

        let mut hits: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let similarity = cosine_similarity(query, &chunk.embedding, query_norm);
                (similarity >= threshold).then(|| ScoredChunk {
                    chunk: chunk.clone(),
                    similarity,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        hits
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_similarity(query: &[f32], other: &[f32], query_norm: f32) -> f32 {
    let other_norm = l2_norm(other);
    if other_norm == 0.0 || query.len() != other.len() {
        return 0.0;
    }
    let dot: f32 = query.iter().zip(other.iter()).map(|(a, b)| a * b).sum();
    dot / (query_norm * other_norm)
}
