//! Per-corpus vector index and its persisted store

mod store;
mod vector_index;

pub use store::{IndexManifest, IndexStore};
pub use vector_index::{ScoredChunk, VectorIndex};
