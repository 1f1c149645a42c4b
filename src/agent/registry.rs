//! Tool registry with unique names

use std::sync::Arc;

use crate::error::{Error, Result};

use super::tool::{Tool, ToolDescriptor};

/// Ordered collection of uniquely named tools
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// Duplicate names are a construction-time error, never a silent
    /// overwrite.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.get(tool.name()).is_some() {
            return Err(Error::DuplicateTool(tool.name().to_string()));
        }
        tracing::debug!(tool = tool.name(), "registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Name/description catalog, in registration order
    pub fn catalog(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Answer;
    use async_trait::async_trait;

    struct FixedTool(&'static str);

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "fixed"
        }
        async fn answer(&self, _question: &str) -> crate::error::Result<Answer> {
            Ok(Answer::direct("ok"))
        }
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool("alpha"))).unwrap();
        registry.register(Arc::new(FixedTool("beta"))).unwrap();

        let err = registry.register(Arc::new(FixedTool("alpha"))).unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "alpha"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn catalog_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool("alpha"))).unwrap();
        registry.register(Arc::new(FixedTool("beta"))).unwrap();
        let names: Vec<_> = registry.catalog().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }
}
