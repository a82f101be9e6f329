//! Rendering tool definitions into the shapes backends expect.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ToolDefinition;

/// Wire shape of a tool definition.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SchemaStyle {
    /// `{"type": "function", "function": {"name", "description", "parameters"}}`
    #[default]
    Function,
    /// `{"type": "function", "name", "description", "parameters"}`
    Flat,
}

impl SchemaStyle {
    pub fn render(self, definition: &ToolDefinition) -> Value {
        match self {
            Self::Function => json!({
                "type": "function",
                "function": {
                    "name": definition.name,
                    "description": definition.description,
                    "parameters": definition.parameters,
                },
            }),
            Self::Flat => json!({
                "type": "function",
                "name": definition.name,
                "description": definition.description,
                "parameters": definition.parameters,
            }),
        }
    }

    pub fn render_all(self, definitions: &[ToolDefinition]) -> Vec<Value> {
        definitions.iter().map(|d| self.render(d)).collect()
    }
}

/// Close every object schema with `additionalProperties: false`, recursively.
///
/// Explicit `additionalProperties` values are left untouched.
pub fn strict_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(obj) => {
            let mut normalized: serde_json::Map<String, Value> = obj
                .iter()
                .map(|(key, value)| (key.clone(), strict_schema(value)))
                .collect();
            if is_object_schema(schema) {
                normalized
                    .entry("additionalProperties")
                    .or_insert(Value::Bool(false));
            }
            Value::Object(normalized)
        }
        Value::Array(items) => Value::Array(items.iter().map(strict_schema).collect()),
        _ => schema.clone(),
    }
}

/// Remove every `additionalProperties` keyword, recursively.
pub fn strip_additional_properties(schema: &Value) -> Value {
    match schema {
        Value::Object(obj) => Value::Object(
            obj.iter()
                .filter(|(key, _)| key.as_str() != "additionalProperties")
                .map(|(key, value)| (key.clone(), strip_additional_properties(value)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(strip_additional_properties).collect())
        }
        _ => schema.clone(),
    }
}

fn is_object_schema(value: &Value) -> bool {
    matches!(value.get("type"), Some(Value::String(t)) if t == "object")
}
