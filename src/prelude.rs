//! Convenience re-exports for common use.

pub use crate::backend::{Backend, BackendRequest, BackendTurn, RawToolCall, ToolDefinition};
pub use crate::context::Context;
pub use crate::error::{AgentError, Result};
pub use crate::executor::{
    AgentExecutor, ExecuteOverrides, ExecutorConfig, ExecutorFactory, ExecutorState, SessionManager,
};
pub use crate::tools::{DispatchMode, Tool, ToolArguments, ToolDescriptor, ToolRegistry, ToolSchema};
pub use crate::types::{
    FinishReason, ResponseEvent, Role, SamplingParams, ToolCallRequest, ToolCallResult, Turn,
    TurnContent, UsageStats,
};
