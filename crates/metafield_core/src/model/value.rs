//! Typed value coercion between raw storage text and JSON scalars.
//!
//! # Responsibility
//! - Re-impose a field's declared type on values read back from storage.
//! - Encode desired JSON scalars into raw storage text for writes.
//!
//! # Invariants
//! - Coercion is total for the supported types; it never fails, it casts.
//! - Raw encoding accepts scalars only; compound values are refused.

use crate::model::field::ValueType;
use serde_json::{Number, Value};

/// Casts one value to the declared type.
///
/// Generic key/value storage cannot round-trip booleans (and loses numeric
/// typing), so every read passes stored text and registered defaults through
/// this cast before serialization.
pub fn coerce(value: &Value, value_type: ValueType) -> Value {
    match value_type {
        ValueType::String => Value::String(stringify(value)),
        ValueType::Number => {
            let number = Number::from_f64(numberify(value)).unwrap_or_else(|| Number::from(0));
            Value::Number(number)
        }
        ValueType::Boolean => Value::Bool(is_truthy(value)),
    }
}

/// Casts one raw stored value to the declared type.
pub fn coerce_raw(raw: &str, value_type: ValueType) -> Value {
    coerce(&Value::String(raw.to_string()), value_type)
}

/// Encodes one desired scalar as raw storage text.
///
/// Returns `None` for arrays and objects; the caller reports those as
/// invalid input rather than storing an interpretation of them. The encoding
/// must survive the matching coercion: `true` becomes `"1"` and `false`
/// becomes the empty string, both of which cast back faithfully.
pub fn raw_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Some(stringify(value)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Returns whether raw text holds a compound (list/map) payload.
///
/// Storage can contain values written by collaborators that encode whole
/// structures into one entry; entry-level APIs hide those instead of
/// returning text that silently loses its structure.
pub fn is_compound_raw(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return false;
    }
    matches!(
        serde_json::from_str::<Value>(raw),
        Ok(Value::Array(_)) | Ok(Value::Object(_))
    )
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => integer.to_string(),
            None => number.to_string(),
        },
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn numberify(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => leading_float(text),
        _ => 0.0,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(false, |n| n != 0.0),
        Value::String(text) => !(text.is_empty() || text == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Parses the longest leading numeric prefix of `text`, or `0.0`.
///
/// Matches the host cast for text like `"3.5px"` (reads `3.5`) and plain
/// garbage (reads `0.0`).
fn leading_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let mut seen_digit = false;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        seen_digit = true;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return 0.0;
    }

    // Optional exponent, only kept when complete.
    let mantissa_end = end;
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    trimmed[..end]
        .parse::<f64>()
        .or_else(|_| trimmed[..mantissa_end].parse::<f64>())
        .unwrap_or(0.0)
}
