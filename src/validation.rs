//! Tool Argument Validation
//!
//! Walks a tool's input schema and checks the supplied arguments against it
//! before any handler runs. Covers the schema subset tools actually declare:
//! `type`, `required`, `properties`, `items`, `enum`, and boolean
//! `additionalProperties`. Anything outside that subset is accepted and left
//! to the handler's own deserialization.
//!
//! Failures report the first offending field path (e.g. `board.items[2].id`)
//! so clients can point at the exact argument that was wrong.

use {
    crate::error::{GatewayError, GatewayResult},
    serde_json::Value,
    tracing::debug,
};

/// Validate `arguments` against `schema`, reporting the first mismatch.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> GatewayResult<()> {
    debug!("🔍 Validating arguments against input schema");
    validate_value(schema, arguments, String::new())
}

fn validate_value(schema: &Value, value: &Value, path: String) -> GatewayResult<()> {
    let schema_obj = match schema.as_object() {
        Some(obj) => obj,
        // Non-object schemas (true/absent) accept everything
        None => return Ok(()),
    };

    if let Some(expected) = schema_obj.get("type") {
        check_type(expected, value, &path)?;
    }

    if let Some(allowed) = schema_obj.get("enum").and_then(|e| e.as_array()) {
        if !allowed.contains(value) {
            return Err(mismatch(&path, format!("value not in enum {allowed:?}")));
        }
    }

    if let Some(obj) = value.as_object() {
        if let Some(required) = schema_obj.get("required").and_then(|r| r.as_array()) {
            for name in required.iter().filter_map(|n| n.as_str()) {
                if !obj.contains_key(name) {
                    return Err(mismatch(
                        &join_field(&path, name),
                        "missing required field".to_string(),
                    ));
                }
            }
        }

        let properties = schema_obj.get("properties").and_then(|p| p.as_object());

        if let Some(props) = properties {
            for (name, field_schema) in props {
                if let Some(field_value) = obj.get(name) {
                    validate_value(field_schema, field_value, join_field(&path, name))?;
                }
            }
        }

        if schema_obj.get("additionalProperties") == Some(&Value::Bool(false)) {
            for name in obj.keys() {
                let declared = properties.is_some_and(|p| p.contains_key(name));
                if !declared {
                    return Err(mismatch(
                        &join_field(&path, name),
                        "unexpected field".to_string(),
                    ));
                }
            }
        }
    }

    if let Some(items) = value.as_array() {
        if let Some(item_schema) = schema_obj.get("items") {
            for (index, item) in items.iter().enumerate() {
                validate_value(item_schema, item, format!("{path}[{index}]"))?;
            }
        }
    }

    Ok(())
}

fn check_type(expected: &Value, value: &Value, path: &str) -> GatewayResult<()> {
    // "type" may be a single name or a list of alternatives
    let names: Vec<&str> = match expected {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(|n| n.as_str()).collect(),
        _ => return Ok(()),
    };

    if names.iter().any(|name| matches_type(name, value)) {
        return Ok(());
    }

    Err(mismatch(
        path,
        format!("expected {}, got {}", names.join(" or "), type_name(value)),
    ))
}

fn matches_type(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        // Unknown type names accept everything
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_field(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn mismatch(path: &str, message: String) -> GatewayError {
    debug!(path = %path, message = %message, "❌ Argument validation failed");
    GatewayError::Validation {
        path: path.to_string(),
        message,
    }
}
