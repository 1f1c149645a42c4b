//! Single-corpus query engine

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::index::VectorIndex;
use crate::providers::{ChatProvider, EmbeddingProvider};
use crate::types::{Answer, SourceRef};

use super::prompt::PromptBuilder;

/// Answers one question at a time against one corpus.
///
/// Stateless across calls: no conversation memory.
pub struct QueryEngine {
    index: VectorIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatProvider>,
    retrieval: RetrievalConfig,
}

impl QueryEngine {
    /// Create a query engine over a built or loaded index
    pub fn new(
        index: VectorIndex,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            chat,
            retrieval,
        }
    }

    /// Corpus this engine answers about
    pub fn corpus(&self) -> &str {
        &self.index.manifest().corpus
    }

    /// Answer a question from the corpus.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let query_embedding = self.embedder.embed(question).await?;
        let hits = self.index.search(
            &query_embedding,
            self.retrieval.top_k,
            self.retrieval.similarity_threshold,
        );

        tracing::debug!(
            corpus = self.corpus(),
            hits = hits.len(),
            "retrieved context"
        );

        let context = PromptBuilder::build_context(&hits);
        let text = self
            .chat
            .complete(
                PromptBuilder::answer_system(),
                &PromptBuilder::answer_prompt(question, &context),
            )
            .await?;

        let sources = hits
            .iter()
            .map(|hit| SourceRef {
                source: hit.chunk.source.clone(),
                chunk_index: hit.chunk.index,
                similarity: hit.similarity,
            })
            .collect();

        Ok(Answer { text, sources })
    }
}
