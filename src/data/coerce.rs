//! Loose scalar coercion for typed data access
//!
//! Request data arrives as strings (query, forms) or arbitrary JSON (bodies).
//! Typed accessors convert stored values with the rules below instead of
//! failing; a value that cannot be read as the target type becomes that
//! type's zero value.
//!
//! | stored            | int            | float     | bool  | string        |
//! |-------------------|----------------|-----------|-------|---------------|
//! | `null`            | `0`            | `0.0`     | false | `""`          |
//! | `true` / `false`  | `1` / `0`      | `1.0`/`0` | same  | `"1"` / `""`  |
//! | `"42abc"`         | `42`           | `42.0`    | true  | verbatim      |
//! | `"abc"`           | `0`            | `0.0`     | true  | verbatim      |
//! | `"0"` / `""`      | `0`            | `0.0`     | false | verbatim      |
//! | `[]` / `{}`       | `0`            | `0.0`     | false | compact JSON  |
//! | non-empty list    | `1`            | `1.0`     | true  | compact JSON  |

use serde_json::{Number, Value};

/// `true` unless the value is one of the falsy values
///
/// Falsy: `null`, `false`, `0`, `0.0`, `""`, `"0"`, empty list, empty object.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Longest numeric prefix of `s` after leading whitespace
///
/// Accepts an optional sign, digits, an optional fraction and an optional
/// exponent. Returns `None` when no digit is found.
fn numeric_prefix(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    Some(&s[..end])
}

fn string_to_float(s: &str) -> f64 {
    numeric_prefix(s)
        .and_then(|p| p.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn string_to_int(s: &str) -> i64 {
    match numeric_prefix(s) {
        Some(p) if !p.contains(['.', 'e', 'E']) => p
            .parse::<i64>()
            .unwrap_or_else(|_| float_to_int(string_to_float(p))),
        Some(p) => float_to_int(p.parse::<f64>().unwrap_or(0.0)),
        None => 0,
    }
}

fn float_to_int(f: f64) -> i64 {
    if f.is_nan() {
        0
    } else {
        // `as` saturates at the i64 bounds
        f.trunc() as i64
    }
}

/// Coerce to an integer
#[must_use]
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .unwrap_or_else(|| float_to_int(n.as_f64().unwrap_or(0.0))),
        Value::String(s) => string_to_int(s),
        Value::Array(_) | Value::Object(_) => i64::from(is_truthy(value)),
    }
}

/// Coerce to a float
#[must_use]
pub fn to_float(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => string_to_float(s),
        Value::Array(_) | Value::Object(_) => f64::from(u8::from(is_truthy(value))),
    }
}

/// Coerce to a boolean (see [`is_truthy`])
#[must_use]
pub fn to_bool(value: &Value) -> bool {
    is_truthy(value)
}

/// Coerce to a string
#[must_use]
pub fn to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce to a list
///
/// Lists are kept, objects yield their values, falsy scalars give the empty
/// list and any other scalar is wrapped into a single-element list.
#[must_use]
pub fn to_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        scalar if !is_truthy(&scalar) => Vec::new(),
        scalar => vec![scalar],
    }
}

/// Coerce `value` to the JSON type of `default`
///
/// The dynamic form of the typed accessors: a `null` default (or an object
/// default, which has no scalar form) returns the value untouched.
#[must_use]
pub fn coerce_like(value: Value, default: &Value) -> Value {
    match default {
        Value::Null | Value::Object(_) => value,
        Value::Bool(_) => Value::Bool(to_bool(&value)),
        Value::Number(n) if n.is_f64() => Number::from_f64(to_float(&value))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Value::Number(_) => Value::from(to_int(&value)),
        Value::String(_) => Value::String(to_string(&value)),
        Value::Array(_) => Value::Array(to_list(value)),
    }
}
