//! Conversation turns and tool-call requests.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Conversation role.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Content carried by a turn: plain text or a structured value.
///
/// Serialized untagged, so a text turn persists as a bare JSON string.
/// A structured value is never a JSON string; use [`TurnContent::from_value`]
/// to normalize arbitrary values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Structured(serde_json::Value),
}

impl TurnContent {
    /// Normalize a JSON value, mapping JSON strings to [`TurnContent::Text`].
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }

    /// The text, if this is text content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Render as a string; structured values are serialized compactly.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl From<String> for TurnContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for TurnContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A tool call requested by the backend, in canonical form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCallRequest {
    /// Backend-assigned id, unique within the turn that carried it.
    pub id: String,
    pub name: String,
    /// Encoded argument payload exactly as the backend produced it.
    pub raw_arguments: String,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            raw_arguments: raw_arguments.into(),
        }
    }
}

/// One entry in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TurnContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    /// Set only on tool turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Turn {
    fn with_content(role: Role, content: Option<TurnContent>) -> Self {
        Self {
            role,
            content,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a system turn.
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_content(Role::System, Some(TurnContent::Text(text.into())))
    }

    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_content(Role::User, Some(TurnContent::Text(text.into())))
    }

    /// Create an assistant text turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_content(Role::Assistant, Some(TurnContent::Text(text.into())))
    }

    /// Create an assistant turn from whatever content the backend returned.
    pub fn assistant_content(content: Option<TurnContent>) -> Self {
        Self::with_content(Role::Assistant, content)
    }

    /// Create an assistant turn recording the backend's tool-call requests.
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// Create a tool result turn answering the request with `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(TurnContent::Text(content.into())),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Text content, if any. Structured content yields `None`.
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(TurnContent::as_text)
    }

    /// Tool-call requests carried by this turn (empty for most turns).
    pub fn requested_calls(&self) -> &[ToolCallRequest] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}
