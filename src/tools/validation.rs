//! Validate decoded tool arguments against the tool's JSON Schema.
//!
//! Checks are top-level only: object type, required fields, declared
//! property types, enum membership, and `additionalProperties: false`.

use serde_json::Value;

/// Validate `args` against `schema`, returning the first violation found.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), String> {
    if schema.get("type").and_then(Value::as_str) == Some("object") && !args.is_object() {
        return Err(format!(
            "expected object arguments, got {}",
            json_type_name(args)
        ));
    }

    let Some(obj) = args.as_object() else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(name) {
                return Err(format!("missing required field '{name}'"));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));

    for (key, value) in obj {
        let Some(prop_schema) = properties.and_then(|p| p.get(key)) else {
            if closed {
                return Err(format!("unexpected field '{key}'"));
            }
            continue;
        };

        if let Some(expected) = prop_schema.get("type").and_then(Value::as_str) {
            if !value_matches_type(value, expected) {
                return Err(format!(
                    "field '{}' expected type '{}', got {}",
                    key,
                    expected,
                    json_type_name(value)
                ));
            }
        }

        if let Some(allowed) = prop_schema.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Err(format!("field '{key}' must be one of {}", Value::from(allowed.clone())));
            }
        }
    }

    Ok(())
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
