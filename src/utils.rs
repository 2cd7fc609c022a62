// src/utils.rs
use serde_json::Value;

/// Maximum number of characters of an upstream body kept in error details
pub const ERROR_BODY_LIMIT: usize = 500;

/// Truncate text to `max` characters, marking the cut with an ellipsis
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Name of the JSON type of a value, for diagnostics
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a value carries any data: null, false, zero and empty containers do not
pub fn json_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Display length of a value: characters of a string, characters of the JSON text otherwise
pub fn json_display_len(value: &Value) -> usize {
    if !json_is_truthy(value) {
        return 0;
    }
    match value {
        Value::String(s) => s.chars().count(),
        other => other.to_string().chars().count(),
    }
}

/// Length of a value as a count: characters of a string, entries of an
/// array or object, characters of the JSON text for scalars
pub fn json_item_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => json_display_len(other),
    }
}
