//! Mint independent executors that share one backend and one registry.

use std::sync::Arc;

use super::config::ExecutorConfig;
use super::agent::AgentExecutor;
use crate::backend::Backend;
use crate::error::Result;
use crate::tools::{Tool, ToolRegistry};
use crate::types::Turn;

/// Creates executors with a shared backend, registry and configuration.
///
/// Each executor gets its own context; the registry is shared read-only.
#[derive(Clone)]
pub struct ExecutorFactory {
    backend: Arc<dyn Backend>,
    registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl ExecutorFactory {
    pub fn new(
        backend: Arc<dyn Backend>,
        tools: Vec<Arc<dyn Tool>>,
        config: ExecutorConfig,
    ) -> Result<Self> {
        Ok(Self::with_registry(
            backend,
            Arc::new(ToolRegistry::new(tools)?),
            config,
        ))
    }

    pub fn with_registry(
        backend: Arc<dyn Backend>,
        registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            backend,
            registry,
            config,
        }
    }

    /// A fresh session.
    pub fn create(&self) -> AgentExecutor {
        AgentExecutor::with_registry(
            Arc::clone(&self.backend),
            Arc::clone(&self.registry),
            self.config.clone(),
        )
    }

    /// A session resumed from an exported turn log.
    pub fn resume(&self, turns: Vec<Turn>) -> Result<AgentExecutor> {
        AgentExecutor::resume(
            Arc::clone(&self.backend),
            Arc::clone(&self.registry),
            self.config.clone(),
            turns,
        )
    }

    /// Replace the registry handed to executors created from now on.
    pub fn rebind_tools(&mut self, tools: Vec<Arc<dyn Tool>>) -> Result<()> {
        self.registry = Arc::new(ToolRegistry::new(tools)?);
        Ok(())
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl std::fmt::Debug for ExecutorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorFactory")
            .field("backend", &self.backend.name())
            .field("registry", &self.registry)
            .finish()
    }
}
