//! Error types for agentkit.

pub mod category;

pub use category::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all agentkit operations.
///
/// Only configuration and backend failures stop forward progress. Tool
/// failures are reported inline on [`crate::types::ToolCallResult`] and never
/// reach the caller as an `Err`; the [`AgentError::ToolExecution`] variant
/// exists so tool handlers have a typed way to fail.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Backend error ({backend}): {message}")]
    Backend { backend: String, message: String },

    #[error("Malformed backend reply: {0}")]
    MalformedReply(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Exceeded maximum of {max_rounds} generate rounds")]
    MaxRoundsExceeded { max_rounds: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Create a backend error attributed to the named backend.
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a tool execution error for a handler to return.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Backend { .. } | Self::MalformedReply(_) => ErrorCategory::Backend,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::ToolExecution { .. } | Self::InvalidArgument(_) => ErrorCategory::ToolExecution,
            Self::MaxRoundsExceeded { .. } => ErrorCategory::RoundLimit,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether this error is potentially retryable. Malformed replies are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Timeout(_))
    }

    /// Whether this error ends an `execute` loop.
    pub fn is_fatal_for_loop(&self) -> bool {
        !matches!(self.category(), ErrorCategory::ToolExecution)
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::Backend => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::RoundLimit => RecoverySuggestion::RaiseRoundLimit,
            ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
            ErrorCategory::Serialization | ErrorCategory::Io => RecoverySuggestion::InspectInput,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentError>;
