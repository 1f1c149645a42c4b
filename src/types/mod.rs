//! Core types for documents, chunks, and answers

pub mod document;
pub mod response;

pub use document::{corpus_fingerprint, Chunk, Document};
pub use response::{Answer, SourceRef};
