//! Parameterized load → index → wrap → ask pipeline
//!
//! One pipeline covers the single-book and multi-book cases: a corpus list
//! becomes per-corpus indexes, a tool per corpus, and optionally a router
//! over the tool set plus a composed sub-question engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::agent::{
    LlmToolSelector, QueryEngineTool, RouterAgent, SubQuestionEngine, ToolRegistry, ToolSelector,
};
use crate::config::Config;
use crate::engine::QueryEngine;
use crate::error::{Error, Result};
use crate::index::IndexStore;
use crate::ingestion::{corpus_name_for_path, load_path};
use crate::providers::{ChatProvider, EmbeddingProvider, OpenAiClient};

/// Orchestrates loading, indexing, and agent assembly
pub struct BookPipeline {
    config: Config,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatProvider>,
    store: IndexStore,
}

impl BookPipeline {
    /// Pipeline with explicit providers (tests inject mocks here)
    pub fn new(
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
    ) -> Self {
        let store = IndexStore::new(&config, Arc::clone(&embedder));
        Self {
            config,
            embedder,
            chat,
            store,
        }
    }

    /// Pipeline backed by the configured OpenAI-compatible API
    pub fn from_config(config: Config) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(&config)?);
        Ok(Self::new(
            config,
            Arc::clone(&client) as Arc<dyn EmbeddingProvider>,
            client as Arc<dyn ChatProvider>,
        ))
    }

    /// Pipeline configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Index store (for explicit invalidation)
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Load one book (file or directory), open or build its index, and wrap
    /// it as a query engine.
    pub async fn open_book(&self, path: &Path) -> Result<QueryEngine> {
        let corpus = corpus_name_for_path(path);
        let docs = load_path(path)?;
        let index = self.store.open_or_build(&corpus, &docs).await?;
        Ok(QueryEngine::new(
            index,
            Arc::clone(&self.embedder),
            Arc::clone(&self.chat),
            self.config.retrieval.clone(),
        ))
    }

    /// Open a named corpus from the books directory.
    pub async fn open_corpus(&self, name: &str) -> Result<QueryEngine> {
        let path = self
            .corpus_paths()?
            .into_iter()
            .find(|p| corpus_name_for_path(p) == name)
            .ok_or_else(|| Error::SourceNotFound(self.config.books_dir.join(name)))?;
        self.open_book(&path).await
    }

    /// Build (or reuse) an index for every corpus under the books directory.
    /// Returns (corpus, chunk count) pairs.
    pub async fn index_library(&self) -> Result<Vec<(String, usize)>> {
        let mut built = Vec::new();
        for path in self.corpus_paths()? {
            let corpus = corpus_name_for_path(&path);
            let docs = load_path(&path)?;
            let index = self.store.open_or_build(&corpus, &docs).await?;
            built.push((corpus, index.len()));
        }
        Ok(built)
    }

    /// Names of every corpus under the books directory.
    pub fn list_corpora(&self) -> Result<Vec<String>> {
        Ok(self
            .corpus_paths()?
            .iter()
            .map(|p| corpus_name_for_path(p))
            .collect())
    }

    /// Assemble the multi-book agent: a query tool per corpus, a composed
    /// sub-question engine when more than one corpus exists, and an
    /// LLM-backed selector.
    pub async fn open_library(&self) -> Result<RouterAgent> {
        let selector = Arc::new(LlmToolSelector::new(Arc::clone(&self.chat)));
        self.open_library_with(selector).await
    }

    /// Same as `open_library` but with an injected selection strategy.
    pub async fn open_library_with(&self, selector: Arc<dyn ToolSelector>) -> Result<RouterAgent> {
        let mut books = ToolRegistry::new();
        for path in self.corpus_paths()? {
            let engine = self.open_book(&path).await?;
            books.register(Arc::new(QueryEngineTool::for_corpus(engine)))?;
        }

        let mut registry = books.clone();
        if books.len() > 1 {
            registry.register(Arc::new(SubQuestionEngine::new(
                books,
                Arc::clone(&self.chat),
            )))?;
        }

        tracing::info!(tools = registry.len(), "library agent ready");
        Ok(RouterAgent::new(registry, selector, Arc::clone(&self.chat)))
    }

    /// One corpus per subdirectory or top-level book file under the books
    /// directory, in name order.
    fn corpus_paths(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.config.books_dir;
        if !dir.exists() {
            return Err(Error::SourceNotFound(dir.clone()));
        }

        let mut paths = Vec::new();
        let mut entries: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();

        for path in entries {
            if path.is_dir() {
                paths.push(path);
            } else if let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase())
            {
                if matches!(
                    ext.as_str(),
                    "epub" | "txt" | "md" | "markdown" | "text" | "html" | "htm"
                ) {
                    paths.push(path);
                }
            }
        }

        Ok(paths)
    }
}
