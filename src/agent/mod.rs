//! Tools, the tool registry, and the LLM-routed agent

mod registry;
mod router;
mod subquestion;
mod tool;

pub use registry::ToolRegistry;
pub use router::{LlmToolSelector, RouterAgent, Selection, SubQuestion, ToolSelector};
pub use subquestion::SubQuestionEngine;
pub use tool::{QueryEngineTool, Tool, ToolDescriptor};
