//! Model backend contract.
//!
//! A backend receives a read-only snapshot of the conversation plus the tool
//! definitions and returns exactly one [`BackendTurn`]. Concrete wire
//! protocols live outside this crate; implement [`Backend`] to plug one in.

pub mod schema;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::types::{FinishReason, Role, SamplingParams, Turn, TurnContent, UsageStats};

pub use schema::SchemaStyle;

/// Tool definition advertised to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Everything a backend needs for one call.
#[derive(Debug, Clone, Copy)]
pub struct BackendRequest<'a> {
    pub turns: &'a [Turn],
    pub tools: &'a [ToolDefinition],
    pub sampling: &'a SamplingParams,
}

/// A tool call in the backend's native encoding.
///
/// Two encodings are accepted: the nested chat shape
/// `{"id", "type": "function", "function": {"name", "arguments"}}` and the
/// flat realtime shape `{"id"?, "call_id", "name", "arguments"}`. In the flat
/// shape `id` names the conversation item and `call_id` the call; results are
/// correlated by `call_id` when present. `arguments` may be an encoded JSON
/// string or an already-decoded value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawToolCall {
    Function {
        #[serde(default)]
        id: Option<String>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        function: RawFunction,
    },
    Flat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        arguments: serde_json::Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawFunction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl RawToolCall {
    /// Nested chat-style call.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<serde_json::Value>,
    ) -> Self {
        Self::Function {
            id: Some(id.into()),
            kind: Some("function".to_string()),
            function: RawFunction {
                name: Some(name.into()),
                arguments: arguments.into(),
            },
        }
    }

    /// Flat realtime-style call.
    pub fn flat(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<serde_json::Value>,
    ) -> Self {
        Self::Flat {
            id: None,
            call_id: Some(id.into()),
            name: Some(name.into()),
            arguments: arguments.into(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Function { id, .. } => id.as_deref(),
            Self::Flat { id, call_id, .. } => call_id.as_deref().or(id.as_deref()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Function { function, .. } => function.name.as_deref(),
            Self::Flat { name, .. } => name.as_deref(),
        }
    }

    pub fn arguments(&self) -> &serde_json::Value {
        match self {
            Self::Function { function, .. } => &function.arguments,
            Self::Flat { arguments, .. } => arguments,
        }
    }
}

/// One reply from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendTurn {
    pub role: Role,
    pub content: Option<TurnContent>,
    pub tool_calls_raw: Vec<RawToolCall>,
    pub usage: Option<UsageStats>,
    pub refusal: Option<String>,
    pub finish_reason: Option<FinishReason>,
}

impl BackendTurn {
    /// A plain text answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(TurnContent::Text(text.into())),
            tool_calls_raw: Vec::new(),
            usage: None,
            refusal: None,
            finish_reason: Some(FinishReason::Stop),
        }
    }

    /// A turn requesting tools, without content.
    pub fn tool_calls(calls: Vec<RawToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_calls_raw: calls,
            usage: None,
            refusal: None,
            finish_reason: Some(FinishReason::ToolCalls),
        }
    }

    pub fn with_content(mut self, content: impl Into<TurnContent>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_usage(mut self, usage: UsageStats) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_refusal(mut self, refusal: impl Into<String>) -> Self {
        self.refusal = Some(refusal.into());
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls_raw.is_empty()
    }
}

/// Core trait implemented by every model backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Produce the next turn for the given snapshot.
    ///
    /// Network failures, timeouts and undecodable replies are reported as
    /// `Err`; the executor never retries on its own unless configured to.
    async fn generate(&self, request: BackendRequest<'_>) -> Result<BackendTurn, AgentError>;
}
