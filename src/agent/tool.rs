//! Tool trait and the query-engine tool adapter

use async_trait::async_trait;

use crate::engine::QueryEngine;
use crate::error::Result;
use crate::types::Answer;

/// A named, described capability the router can select
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (the routing key)
    fn name(&self) -> &str;

    /// Description the selector matches questions against
    fn description(&self) -> &str;

    /// Answer a question with this tool
    async fn answer(&self, question: &str) -> Result<Answer>;
}

/// Name/description pair handed to selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
}

/// Wraps a single-corpus query engine as a tool
pub struct QueryEngineTool {
    name: String,
    description: String,
    engine: QueryEngine,
}

impl QueryEngineTool {
    /// Create a tool around a query engine
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        engine: QueryEngine,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            engine,
        }
    }

    /// Tool for a corpus, with a description derived from its name
    pub fn for_corpus(engine: QueryEngine) -> Self {
        let corpus = engine.corpus().to_string();
        let description = format!(
            "Answers questions about the contents of the book '{}'.",
            corpus
        );
        Self::new(corpus, description, engine)
    }
}

#[async_trait]
impl Tool for QueryEngineTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn answer(&self, question: &str) -> Result<Answer> {
        self.engine.answer(question).await
    }
}
