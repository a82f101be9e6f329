//! Tool call results and the events emitted by the executor.

use serde::{Deserialize, Serialize};

use super::message::{Role, ToolCallRequest, TurnContent};
use super::usage::UsageStats;

/// Outcome of dispatching one tool-call request.
///
/// Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallResult {
    pub fn success(request: &ToolCallRequest, result: serde_json::Value) -> Self {
        Self {
            tool_call_id: request.id.clone(),
            tool_name: request.name.clone(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(request: &ToolCallRequest, error: impl Into<String>) -> Self {
        Self {
            tool_call_id: request.id.clone(),
            tool_name: request.name.clone(),
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// String form used as the content of the tool turn fed back to the backend.
    pub fn content_string(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Error: {error}");
        }
        match &self.result {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(value) => value.to_string(),
            None => "null".to_string(),
        }
    }
}

/// A unit of output emitted to the caller during one round of the loop.
///
/// Events are transient: they are never written into the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEvent {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TurnContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolCallResult>,
    /// Side-channel notifications, one slot per tool result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<Option<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    /// 1-based generate round that produced this event.
    pub round: usize,
    pub is_final: bool,
}

impl ResponseEvent {
    /// The backend asked for tools.
    pub fn tool_calls(
        round: usize,
        content: Option<TurnContent>,
        tool_calls: Vec<ToolCallRequest>,
        usage: Option<UsageStats>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_results: Vec::new(),
            notifications: Vec::new(),
            usage,
            refusal: None,
            round,
            is_final: false,
        }
    }

    /// Tools were dispatched.
    pub fn tool_results(
        round: usize,
        tool_results: Vec<ToolCallResult>,
        notifications: Vec<Option<serde_json::Value>>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: None,
            tool_calls: Vec::new(),
            tool_results,
            notifications,
            usage: None,
            refusal: None,
            round,
            is_final: false,
        }
    }

    /// The backend answered without requesting tools.
    pub fn final_reply(
        round: usize,
        content: Option<TurnContent>,
        usage: Option<UsageStats>,
        refusal: Option<String>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            notifications: Vec::new(),
            usage,
            refusal,
            round,
            is_final: true,
        }
    }

    /// Text content of the event, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(TurnContent::as_text)
    }
}
