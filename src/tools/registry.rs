//! Closed name → tool mapping, validated once at construction.

use std::collections::HashMap;
use std::sync::Arc;

use super::tool::Tool;
use crate::backend::ToolDefinition;
use crate::error::{AgentError, Result};

/// Immutable tool registry.
///
/// Built once and never mutated; replacing the tools of an executor swaps the
/// whole registry. Share it across sessions behind an `Arc`.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry, rejecting empty names, missing schemas and duplicates.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            let name = tool.name();
            if name.trim().is_empty() {
                return Err(AgentError::Configuration(format!(
                    "tool at position {position} has an empty name"
                )));
            }
            if tool.schema().is_missing() {
                return Err(AgentError::Configuration(format!(
                    "tool '{name}' does not declare a parameter schema"
                )));
            }
            if index.insert(name.to_string(), position).is_some() {
                return Err(AgentError::Configuration(format!(
                    "tool '{name}' is registered more than once"
                )));
            }
        }
        Ok(Self { tools, index })
    }

    /// A registry with no tools.
    pub fn empty() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Definitions advertised to the backend, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema().schema.clone(),
            })
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
