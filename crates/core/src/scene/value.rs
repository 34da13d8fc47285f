//! Lenient readers over untrusted `sceneParams` JSON.
//!
//! Nothing here fails: a missing or mistyped field reads as `None` (or the
//! caller's default), which keeps every job renderable.

use serde_json::{Map, Value};

/// JSON object view; anything else reads as an empty object.
pub fn as_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

/// Display text for a scalar: strings verbatim, numbers and booleans via
/// their JSON form. `null`, arrays, and objects have no text.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Non-empty display text of `obj[key]`.
pub fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(scalar_text)
        .filter(|s| !s.is_empty())
}

/// Truthiness: `false`, `null`, `0`, `""`, `[]`, and `{}` are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Boolean flag `obj[key]`, `default` when absent.
pub fn flag(obj: &Map<String, Value>, key: &str, default: bool) -> bool {
    obj.get(key).map_or(default, truthy)
}

/// Coerce a JSON number, numeric string or boolean to a finite `f64`.
///
/// Booleans read as `1.0` and `0.0`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Array at `obj[key]`; missing or non-array reads as empty.
pub fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
