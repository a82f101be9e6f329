//! Tool parameter schemas.

use serde::{Deserialize, Serialize};

/// JSON Schema describing a tool's parameters, advertised to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ToolSchema {
    pub schema: serde_json::Value,
}

impl ToolSchema {
    /// Create from a raw JSON Schema value.
    pub fn from_value(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// A schema for a tool that takes no parameters.
    pub fn empty() -> Self {
        Self {
            schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
        }
    }

    /// No schema at all. Rejected at registration.
    pub fn missing() -> Self {
        Self {
            schema: serde_json::Value::Null,
        }
    }

    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
            strict: false,
        }
    }

    /// True when the schema is absent or not a JSON object.
    pub fn is_missing(&self) -> bool {
        !self.schema.is_object()
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
    strict: bool,
}

impl ParameterBuilder {
    fn property(mut self, name: impl Into<String>, property_schema: serde_json::Value, required: bool) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), property_schema);
        if required {
            self.required.push(name);
        }
        self
    }

    /// Add a string property.
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let property_schema = serde_json::json!({ "type": "string", "description": description.into() });
        self.property(name, property_schema, required)
    }

    /// Add a number property.
    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let property_schema = serde_json::json!({ "type": "number", "description": description.into() });
        self.property(name, property_schema, required)
    }

    /// Add an integer property.
    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let property_schema = serde_json::json!({ "type": "integer", "description": description.into() });
        self.property(name, property_schema, required)
    }

    /// Add a boolean property.
    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let property_schema = serde_json::json!({ "type": "boolean", "description": description.into() });
        self.property(name, property_schema, required)
    }

    /// Add an array property with the given item type.
    pub fn array(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        item_type: &str,
        required: bool,
    ) -> Self {
        let property_schema = serde_json::json!({
            "type": "array",
            "description": description.into(),
            "items": { "type": item_type },
        });
        self.property(name, property_schema, required)
    }

    /// Add an enum (string) property.
    pub fn string_enum(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: &[&str],
        required: bool,
    ) -> Self {
        let property_schema = serde_json::json!({
            "type": "string",
            "description": description.into(),
            "enum": values,
        });
        self.property(name, property_schema, required)
    }

    /// Reject arguments that are not declared as properties.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Build into a [`ToolSchema`].
    pub fn build(self) -> ToolSchema {
        let mut schema = serde_json::json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        });
        if self.strict {
            schema["additionalProperties"] = serde_json::Value::Bool(false);
        }
        ToolSchema { schema }
    }
}
