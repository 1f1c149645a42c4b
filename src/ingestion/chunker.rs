//! Text chunking with sentence-boundary awareness

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, Document};

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
    min_size: usize,
}

impl TextChunker {
    /// Create a chunker from configuration
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            overlap: config.chunk_overlap,
            min_size: config.min_chunk_size,
        }
    }

    /// Chunk a document into overlapping, sentence-respecting chunks.
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut index = 0u32;

        for sentence in doc.text.split_sentence_bounds() {
            if !current.is_empty() && current.len() + sentence.len() > self.chunk_size {
                if current.trim().len() >= self.min_size {
                    chunks.push(Chunk::new(doc, current.trim().to_string(), index));
                    index += 1;
                }
                current = self.overlap_tail(&current);
            }
            current.push_str(sentence);
        }

        let tail = current.trim();
        if tail.len() >= self.min_size {
            chunks.push(Chunk::new(doc, tail.to_string(), index));
        } else if chunks.is_empty() && !tail.is_empty() {
            // A document shorter than min_size still yields one chunk, so
            // tiny corpora remain searchable.
            chunks.push(Chunk::new(doc, tail.to_string(), 0));
        }

        chunks
    }

    /// Chunk every document in a corpus.
    pub fn chunk_corpus(&self, docs: &[Document]) -> Vec<Chunk> {
        docs.iter().flat_map(|d| self.chunk_document(d)).collect()
    }

    /// Last `overlap` characters of the finished chunk, cut at a char
    /// boundary, to seed the next chunk.
    fn overlap_tail(&self, text: &str) -> String {
        if self.overlap == 0 || text.len() <= self.overlap {
            return String::new();
        }
        let mut start = text.len() - self.overlap;
        while !text.is_char_boundary(start) {
            start += 1;
        }
        text[start..].to_string()
    }
}
