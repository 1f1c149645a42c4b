//! Query engine: retrieval plus grounded answer generation

mod prompt;
mod query_engine;

pub use prompt::PromptBuilder;
pub use query_engine::QueryEngine;
