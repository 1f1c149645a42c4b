//! Document and chunk types

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A unit of source text: one EPUB chapter or one file.
///
/// Immutable once loaded; owned by the index builder until indexed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Document ID
    pub id: Uuid,
    /// Source identifier (file path, or `path#chapter` for EPUB chapters)
    pub source: String,
    /// Whitespace-normalized text
    pub text: String,
}

impl Document {
    /// Create a document, normalizing whitespace.
    ///
    /// Returns `None` when the text is empty after normalization; such
    /// documents are dropped at load time.
    pub fn new(source: impl Into<String>, raw_text: &str) -> Option<Self> {
        let text = normalize_whitespace(raw_text);
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            source: source.into(),
            text,
        })
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A chunk of document text with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Source identifier of the parent document
    pub source: String,
    /// Chunk text
    pub content: String,
    /// Position of this chunk within the document
    pub index: u32,
    /// Embedding vector (empty until embedded)
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create a chunk without an embedding
    pub fn new(doc: &Document, content: String, index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: doc.id,
            source: doc.source.clone(),
            content,
            index,
            embedding: Vec::new(),
        }
    }
}

/// SHA-256 fingerprint over the ordered document texts of a corpus.
///
/// Document IDs are random per load, so the fingerprint covers only source
/// identifiers and text: the same files loaded twice fingerprint identically.
pub fn corpus_fingerprint(docs: &[Document]) -> String {
    let mut hasher = Sha256::new();
    for doc in docs {
        hasher.update(doc.source.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.text.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_after_normalization_is_dropped() {
        assert!(Document::new("a.txt", "  \n\r\t  ").is_none());
        let doc = Document::new("a.txt", "hello\n\nworld\r\n").unwrap();
        assert_eq!(doc.text, "hello world");
    }

    #[test]
    fn fingerprint_ignores_random_ids() {
        let a = vec![Document::new("a.txt", "the sky is blue").unwrap()];
        let b = vec![Document::new("a.txt", "the sky is blue").unwrap()];
        assert_ne!(a[0].id, b[0].id);
        assert_eq!(corpus_fingerprint(&a), corpus_fingerprint(&b));
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let a = vec![Document::new("a.txt", "the sky is blue").unwrap()];
        let b = vec![Document::new("a.txt", "the grass is green").unwrap()];
        assert_ne!(corpus_fingerprint(&a), corpus_fingerprint(&b));
    }
}
