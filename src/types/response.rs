//! Answer types returned by query engines and the router

use serde::{Deserialize, Serialize};

/// Reference to a retrieved chunk that supported an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source identifier of the chunk's document
    pub source: String,
    /// Chunk position within its document
    pub chunk_index: u32,
    /// Cosine similarity of the chunk to the question
    pub similarity: f32,
}

/// Answer to a single question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The synthesized answer text
    pub text: String,
    /// Chunks the answer was grounded on (empty for direct LLM answers)
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

impl Answer {
    /// Answer with no supporting sources
    pub fn direct(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}
