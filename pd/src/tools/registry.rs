//! ToolRegistry - owns the set of available tools

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::llm::ToolDefinition;

use super::error::ToolError;
use super::traits::Tool;

/// Registry of available tools, indexed by name
///
/// Initialized once at startup and owned for the life of the process.
/// Registration order is preserved so the manifest offered to the model is
/// stable across calls.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, rejecting duplicate names
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        debug!(%name, classification = %tool.classification(), "ToolRegistry::register");
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName { name });
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Resolve a tool by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools.get(name).cloned().ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The manifest offered to the model: name, description, and parameter
    /// schema per tool, in registration order. Handler internals (and even
    /// classifications) are deliberately absent - the model sees only what
    /// it needs to form a call.
    pub fn manifest(&self) -> Vec<ToolDefinition> {
        debug!(count = self.order.len(), "ToolRegistry::manifest");
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }
}
