//! LLM-routed agent over a tool registry

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::engine::PromptBuilder;
use crate::error::Result;
use crate::providers::ChatProvider;
use crate::types::Answer;

use super::registry::ToolRegistry;
use super::tool::ToolDescriptor;

/// One sub-question routed to a named tool
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubQuestion {
    /// Tool to route to
    pub tool: String,
    /// The sub-question for that tool
    pub question: String,
}

/// Routing decision for a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No tool applies; answer from the model alone
    Direct,
    /// One tool answers the whole question
    Single(String),
    /// The question spans tools and is split into sub-questions
    Decompose(Vec<SubQuestion>),
}

/// Strategy for choosing tools for a question.
///
/// Implementations must only return tool names present in the catalog.
#[async_trait]
pub trait ToolSelector: Send + Sync {
    /// Choose how to route the question across the catalog
    async fn select(&self, question: &str, catalog: &[ToolDescriptor]) -> Result<Selection>;
}

/// Raw JSON verdict emitted by the selection model
#[derive(Debug, Deserialize)]
struct SelectionVerdict {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    subquestions: Vec<SubQuestion>,
}

/// Selector that delegates the choice to the chat backend
pub struct LlmToolSelector {
    chat: Arc<dyn ChatProvider>,
}

impl LlmToolSelector {
    /// Create a selector backed by the given chat provider
    pub fn new(chat: Arc<dyn ChatProvider>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl ToolSelector for LlmToolSelector {
    async fn select(&self, question: &str, catalog: &[ToolDescriptor]) -> Result<Selection> {
        if catalog.is_empty() {
            return Ok(Selection::Direct);
        }

        let reply = self
            .chat
            .complete(
                PromptBuilder::selection_system(),
                &PromptBuilder::selection_prompt(question, catalog),
            )
            .await?;

        let Ok(verdict) = serde_json::from_str::<SelectionVerdict>(strip_fences(&reply)) else {
            tracing::warn!(reply = %reply, "unparseable selection verdict, answering directly");
            return Ok(Selection::Direct);
        };

        let known = |name: &str| catalog.iter().any(|d| d.name == name);

        if !verdict.subquestions.is_empty() {
            let subs: Vec<SubQuestion> = verdict
                .subquestions
                .into_iter()
                .filter(|s| {
                    let ok = known(&s.tool);
                    if !ok {
                        tracing::warn!(tool = %s.tool, "selector named an unknown tool, dropping");
                    }
                    ok
                })
                .collect();
            if !subs.is_empty() {
                return Ok(Selection::Decompose(subs));
            }
            return Ok(Selection::Direct);
        }

        match verdict.tool {
            Some(name) if known(&name) => Ok(Selection::Single(name)),
            Some(name) => {
                tracing::warn!(tool = %name, "selector named an unknown tool, answering directly");
                Ok(Selection::Direct)
            }
            None => Ok(Selection::Direct),
        }
    }
}

/// Trim optional markdown code fences around a JSON reply.
pub(crate) fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim_end_matches('`').trim()
}

/// Agent that routes questions across registered tools
pub struct RouterAgent {
    registry: ToolRegistry,
    selector: Arc<dyn ToolSelector>,
    chat: Arc<dyn ChatProvider>,
}

impl RouterAgent {
    /// Create an agent from a registry, a selection strategy, and the chat
    /// provider used for direct answers and synthesis
    pub fn new(
        registry: ToolRegistry,
        selector: Arc<dyn ToolSelector>,
        chat: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            registry,
            selector,
            chat,
        }
    }

    /// Registered tool catalog
    pub fn catalog(&self) -> Vec<ToolDescriptor> {
        self.registry.catalog()
    }

    /// Answer a question, routing through tools as the selector decides.
    pub async fn chat(&self, question: &str) -> Result<Answer> {
        let catalog = self.registry.catalog();
        let selection = self.selector.select(question, &catalog).await?;

        match selection {
            Selection::Direct => {
                tracing::debug!("answering without tools");
                let text = self
                    .chat
                    .complete("You are a helpful assistant.", question)
                    .await?;
                Ok(Answer::direct(text))
            }
            Selection::Single(name) => {
                tracing::debug!(tool = %name, "routing to one tool");
                let tool = self
                    .registry
                    .get(&name)
                    .ok_or_else(|| crate::error::Error::internal(format!(
                        "selector returned unregistered tool '{name}'"
                    )))?;
                tool.answer(question).await
            }
            Selection::Decompose(subs) => {
                run_subquestions(&self.registry, self.chat.as_ref(), question, &subs).await
            }
        }
    }
}

/// Answer each sub-question with its tool and synthesize one response.
pub(crate) async fn run_subquestions(
    registry: &ToolRegistry,
    chat: &dyn ChatProvider,
    question: &str,
    subs: &[SubQuestion],
) -> Result<Answer> {
    tracing::debug!(count = subs.len(), "answering sub-questions");

    let mut partials = Vec::with_capacity(subs.len());
    let mut sources = Vec::new();
    for sub in subs {
        let tool = registry.get(&sub.tool).ok_or_else(|| {
            crate::error::Error::internal(format!(
                "selector returned unregistered tool '{}'",
                sub.tool
            ))
        })?;
        let answer = tool.answer(&sub.question).await?;
        sources.extend(answer.sources);
        partials.push((sub.question.clone(), answer.text));
    }

    if partials.len() == 1 {
        // Nothing to merge.
        let (_, text) = partials.into_iter().next().expect("one partial");
        return Ok(Answer { text, sources });
    }

    let text = chat
        .complete(
            PromptBuilder::synthesis_system(),
            &PromptBuilder::synthesis_prompt(question, &partials),
        )
        .await?;
    Ok(Answer { text, sources })
}
