//! Strict decoding of tool-call arguments and typed access to the result.

use crate::error::AgentError;

/// Key carrying a side-channel notification inside the argument payload.
pub const NOTIFICATION_KEY: &str = "_notification";

/// Arguments decoded from a tool call, as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArguments {
    value: serde_json::Value,
}

/// The result of decoding a raw argument payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArguments {
    pub arguments: ToolArguments,
    /// Value found under [`NOTIFICATION_KEY`], removed from `arguments`.
    pub notification: Option<serde_json::Value>,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Decode a raw payload with a strict JSON parser.
    ///
    /// Empty or whitespace-only payloads decode as `{}`. Anything that is not
    /// a JSON object fails. The notification key is stripped before the
    /// arguments are returned.
    pub fn decode(raw: &str) -> Result<DecodedArguments, AgentError> {
        let trimmed = raw.trim();
        let value = if trimmed.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str::<serde_json::Value>(trimmed).map_err(|e| {
                AgentError::InvalidArgument(format!("arguments are not valid JSON: {e}"))
            })?
        };

        let serde_json::Value::Object(mut map) = value else {
            return Err(AgentError::InvalidArgument(
                "arguments must be a JSON object".to_string(),
            ));
        };
        let notification = map.remove(NOTIFICATION_KEY);

        Ok(DecodedArguments {
            arguments: Self::new(serde_json::Value::Object(map)),
            notification,
        })
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, AgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, AgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a float argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, AgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing float argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, AgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Deserialize the arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, AgentError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            AgentError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
