//! bookqa: per-book vector indexes with LLM-routed query tools
//!
//! Loads EPUB/text books, builds a persisted embedding index per corpus,
//! wraps each index as a query-engine tool, and answers questions through an
//! LLM-backed router that can decompose a question across books.

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::BookPipeline;
pub use types::{Answer, Chunk, Document};
