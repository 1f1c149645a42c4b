//! Composed sub-question engine
//!
//! Always decomposes a question across every tool in its registry and merges
//! the partial answers. Implements `Tool` itself so a router can offer it as
//! a cross-book capability.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::engine::PromptBuilder;
use crate::error::Result;
use crate::providers::ChatProvider;
use crate::types::Answer;

use super::registry::ToolRegistry;
use super::router::{run_subquestions, SubQuestion};
use super::tool::Tool;

#[derive(Debug, Deserialize)]
struct DecomposeVerdict {
    #[serde(default)]
    subquestions: Vec<SubQuestion>,
}

/// Splits a composite question across the tools of a registry
pub struct SubQuestionEngine {
    name: String,
    description: String,
    registry: ToolRegistry,
    chat: Arc<dyn ChatProvider>,
}

impl SubQuestionEngine {
    /// Create a sub-question engine over a registry of per-corpus tools.
    ///
    /// The engine's name is derived so it never collides with a corpus
    /// that happens to share the preferred name.
    pub fn new(registry: ToolRegistry, chat: Arc<dyn ChatProvider>) -> Self {
        let corpora: Vec<String> = registry.catalog().into_iter().map(|d| d.name).collect();
        let mut name = String::from("compare_books");
        let mut n = 2;
        while registry.get(&name).is_some() {
            name = format!("compare_books_{n}");
            n += 1;
        }
        Self {
            name,
            description: format!(
                "Answers questions that span several books ({}) by splitting \
                 them into per-book sub-questions and merging the answers.",
                corpora.join(", ")
            ),
            registry,
            chat,
        }
    }

    /// Ask the model to split the question, one sub-question per relevant
    /// tool. Unknown tool names are dropped.
    async fn decompose(&self, question: &str) -> Result<Vec<SubQuestion>> {
        let catalog = self.registry.catalog();
        let reply = self
            .chat
            .complete(
                PromptBuilder::selection_system(),
                &PromptBuilder::decompose_prompt(question, &catalog),
            )
            .await?;

        let verdict: DecomposeVerdict =
            serde_json::from_str(super::router::strip_fences(&reply)).unwrap_or(DecomposeVerdict {
                subquestions: Vec::new(),
            });

        Ok(verdict
            .subquestions
            .into_iter()
            .filter(|s| catalog.iter().any(|d| d.name == s.tool))
            .collect())
    }
}

#[async_trait]
impl Tool for SubQuestionEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn answer(&self, question: &str) -> Result<Answer> {
        let subs = self.decompose(question).await?;
        if subs.is_empty() {
            // Decomposition produced nothing usable; ask every tool the
            // original question instead.
            let subs: Vec<SubQuestion> = self
                .registry
                .catalog()
                .into_iter()
                .map(|d| SubQuestion {
                    tool: d.name,
                    question: question.to_string(),
                })
                .collect();
            return run_subquestions(&self.registry, self.chat.as_ref(), question, &subs).await;
        }
        run_subquestions(&self.registry, self.chat.as_ref(), question, &subs).await
    }
}
