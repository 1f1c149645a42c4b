//! Prompt templates for grounded answers and tool routing

use crate::agent::ToolDescriptor;
use crate::index::ScoredChunk;

/// Prompt builder for retrieval-grounded answers and routing decisions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build a numbered context block from retrieved chunks
    pub fn build_context(hits: &[ScoredChunk]) -> String {
        let mut context = String::new();
        for (i, hit) in hits.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {} (chunk {})\n\n{}\n\n---\n\n",
                i + 1,
                hit.chunk.source,
                hit.chunk.index,
                hit.chunk.content
            ));
        }
        context
    }

    /// System prompt for grounded answering
    pub fn answer_system() -> &'static str {
        "You answer questions using ONLY the provided excerpts. \
         If the excerpts do not contain the answer, say the information \
         is not available in the provided documents. Do not use outside \
         knowledge."
    }

    /// User prompt for grounded answering
    pub fn answer_prompt(question: &str, context: &str) -> String {
        format!(
            "EXCERPTS:\n{context}\nQUESTION: {question}\n\n\
             Answer using only the excerpts above:"
        )
    }

    /// System prompt for tool selection
    pub fn selection_system() -> &'static str {
        "You route questions to query tools. Respond with JSON only, no \
         prose and no code fences."
    }

    /// User prompt asking the model to pick a tool or decompose the question
    pub fn selection_prompt(question: &str, tools: &[ToolDescriptor]) -> String {
        let catalog = tools
            .iter()
            .map(|t| format!("- {}: {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Available tools:\n{catalog}\n\n\
             Question: {question}\n\n\
             Reply with exactly one JSON object:\n\
             - {{\"tool\": \"<name>\"}} when one tool can answer it\n\
             - {{\"subquestions\": [{{\"tool\": \"<name>\", \"question\": \"...\"}}, ...]}} \
             when the question spans multiple tools\n\
             - {{\"tool\": null}} when no tool applies"
        )
    }

    /// User prompt asking the model to decompose across every tool
    pub fn decompose_prompt(question: &str, tools: &[ToolDescriptor]) -> String {
        let catalog = tools
            .iter()
            .map(|t| format!("- {}: {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Available tools:\n{catalog}\n\n\
             Question: {question}\n\n\
             Split the question into sub-questions, one per relevant tool. \
             Reply with exactly one JSON object: \
             {{\"subquestions\": [{{\"tool\": \"<name>\", \"question\": \"...\"}}, ...]}}"
        )
    }

    /// System prompt for merging partial answers
    pub fn synthesis_system() -> &'static str {
        "You combine partial answers into one response. Use only the \
         partial answers provided."
    }

    /// User prompt for merging partial answers
    pub fn synthesis_prompt(question: &str, partials: &[(String, String)]) -> String {
        let parts = partials
            .iter()
            .map(|(sub, answer)| format!("Sub-question: {sub}\nAnswer: {answer}\n"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Original question: {question}\n\n{parts}\n\
             Combine these into one final answer:"
        )
    }
}
