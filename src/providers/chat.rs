//! Chat completion provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM chat completions
///
/// A single system/user turn in, one completion out. Conversation memory is
/// deliberately absent: every call stands alone.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one completion
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;
}
