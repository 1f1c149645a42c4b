//! Provider abstractions for the embedding and chat backends
//!
//! Trait-based so the backend is swappable; tests run against scripted
//! in-memory implementations.

pub mod chat;
pub mod embedding;
pub mod openai;

pub use chat::ChatProvider;
pub use embedding::EmbeddingProvider;
pub use openai::OpenAiClient;
