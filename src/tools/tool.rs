//! Tool trait and closure-based tool descriptor.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::ToolSchema;
use crate::error::AgentError;

/// Core tool trait. Implement it for tools that carry their own state.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the backend calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema for the parameters.
    fn schema(&self) -> &ToolSchema;

    /// Run the tool with decoded, schema-checked arguments.
    async fn call(&self, args: &ToolArguments) -> Result<serde_json::Value, AgentError>;
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, AgentError>> + Send>>;
type BoxedHandler = dyn Fn(ToolArguments) -> HandlerFuture + Send + Sync;

/// A registered callable: name, schema and handler.
///
/// ```
/// use agentkit::tools::{ToolDescriptor, ToolSchema};
///
/// let weather = ToolDescriptor::new(
///     "get_weather",
///     "Current weather for a city",
///     ToolSchema::object().string("city", "City name", true).build(),
///     |args| Ok(format!("18C sunny in {}", args.get_str("city")?).into()),
/// );
/// ```
pub struct ToolDescriptor {
    name: String,
    description: String,
    schema: ToolSchema,
    handler: Arc<BoxedHandler>,
}

impl ToolDescriptor {
    /// Create a descriptor from a synchronous handler.
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Result<serde_json::Value, AgentError> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        Self::new_async(name, description, schema, move |args| {
            let handler = Arc::clone(&handler);
            async move { handler(args) }
        })
    }

    /// Create a descriptor from an async handler.
    pub fn new_async<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, AgentError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Arc::new(move |args| -> HandlerFuture { Box::pin(handler(args)) }),
        }
    }

    /// Wrap into the shared form the registry takes.
    pub fn shared(self) -> Arc<dyn Tool> {
        Arc::new(self)
    }
}

#[async_trait]
impl Tool for ToolDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn call(&self, args: &ToolArguments) -> Result<serde_json::Value, AgentError> {
        (self.handler)(args.clone()).await
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
