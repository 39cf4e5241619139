//! Typed field readers over raw JSON that record violations instead of
//! failing fast, so one pass reports every offending field.

use serde_json::{Map, Value};

use super::{SchemaViolation, ViolationRule};
use crate::path::Path;

pub(crate) type Object = Map<String, Value>;

/// Accumulates violations while a candidate document is normalized.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<SchemaViolation>);

impl Violations {
    pub(crate) fn wrong_type(&mut self, at: Path, expected: &'static str, found: &Value) {
        let message = format!("'{at}' must be {expected}, found {}", kind_of(found));
        self.0.push(SchemaViolation {
            path: at,
            rule: ViolationRule::WrongType,
            expected: Some(expected.to_string()),
            message,
            value: Some(found.clone()),
        });
    }

    pub(crate) fn required(&mut self, at: Path, expected: &'static str) {
        let message = format!("'{at}' is required");
        self.0.push(SchemaViolation {
            path: at,
            rule: ViolationRule::Required,
            expected: Some(expected.to_string()),
            message,
            value: None,
        });
    }

    pub(crate) fn into_vec(self) -> Vec<SchemaViolation> {
        self.0
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A present, non-null field. `null` is treated the same as absent.
fn present<'a>(obj: Option<&'a Object>, key: &str) -> Option<&'a Value> {
    obj.and_then(|o| o.get(key)).filter(|v| !v.is_null())
}

/// Resolve a section value to its object. Absent or `null` sections yield
/// `None` so every field falls back to its default.
pub(crate) fn section<'a>(
    raw: Option<&'a Value>,
    at: &Path,
    violations: &mut Violations,
) -> Option<&'a Object> {
    match raw {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            violations.wrong_type(at.clone(), "an object", other);
            None
        }
    }
}

/// An array element that must be an object.
pub(crate) fn element<'a>(
    item: &'a Value,
    at: Path,
    violations: &mut Violations,
) -> Option<&'a Object> {
    match item {
        Value::Object(map) => Some(map),
        other => {
            violations.wrong_type(at, "an object", other);
            None
        }
    }
}

pub(crate) fn opt_string(
    obj: Option<&Object>,
    key: &str,
    at: &Path,
    violations: &mut Violations,
) -> Option<String> {
    match present(obj, key)? {
        Value::String(s) => Some(s.clone()),
        other => {
            violations.wrong_type(at.clone().field(key), "a string", other);
            None
        }
    }
}

pub(crate) fn string_or(
    obj: Option<&Object>,
    key: &str,
    default: &str,
    at: &Path,
    violations: &mut Violations,
) -> String {
    opt_string(obj, key, at, violations).unwrap_or_else(|| default.to_string())
}

pub(crate) fn required_string(
    obj: Option<&Object>,
    key: &str,
    at: &Path,
    violations: &mut Violations,
) -> String {
    if present(obj, key).is_none() {
        violations.required(at.clone().field(key), "a string");
        return String::new();
    }
    opt_string(obj, key, at, violations).unwrap_or_default()
}

pub(crate) fn bool_or(
    obj: Option<&Object>,
    key: &str,
    default: bool,
    at: &Path,
    violations: &mut Violations,
) -> bool {
    match present(obj, key) {
        None => default,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            violations.wrong_type(at.clone().field(key), "a boolean", other);
            default
        }
    }
}

/// Any JSON number, floored to an integer.
pub(crate) fn floored_int(
    obj: Option<&Object>,
    key: &str,
    at: &Path,
    violations: &mut Violations,
) -> Option<i64> {
    match present(obj, key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        other => {
            violations.wrong_type(at.clone().field(key), "a number", other);
            None
        }
    }
}

/// A pixel dimension: a non-negative whole number that fits in `u32`.
pub(crate) fn opt_dimension(
    obj: Option<&Object>,
    key: &str,
    at: &Path,
    violations: &mut Violations,
) -> Option<u32> {
    let value = present(obj, key)?;
    let whole = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u64)
        }),
        _ => None,
    };
    match whole.and_then(|w| u32::try_from(w).ok()) {
        Some(dimension) => Some(dimension),
        None => {
            violations.wrong_type(at.clone().field(key), "a non-negative integer", value);
            None
        }
    }
}

pub(crate) fn opt_f64(
    obj: Option<&Object>,
    key: &str,
    at: &Path,
    violations: &mut Violations,
) -> Option<f64> {
    match present(obj, key)? {
        Value::Number(n) => n.as_f64(),
        other => {
            violations.wrong_type(at.clone().field(key), "a number", other);
            None
        }
    }
}

/// A list field. `None` when absent so callers can tell "missing" from
/// "present but empty".
pub(crate) fn array<'a>(
    obj: Option<&'a Object>,
    key: &str,
    at: &Path,
    violations: &mut Violations,
) -> Option<&'a [Value]> {
    match present(obj, key)? {
        Value::Array(items) => Some(items.as_slice()),
        other => {
            violations.wrong_type(at.clone().field(key), "an array", other);
            None
        }
    }
}

pub(crate) fn string_list(
    obj: Option<&Object>,
    key: &str,
    at: &Path,
    violations: &mut Violations,
) -> Option<Vec<String>> {
    let items = array(obj, key, at, violations)?;
    let list_path = at.clone().field(key);
    let strings = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match item {
            Value::String(s) => Some(s.clone()),
            other => {
                violations.wrong_type(list_path.clone().index(i), "a string", other);
                None
            }
        })
        .collect();
    Some(strings)
}
