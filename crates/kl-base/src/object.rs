//! Accessors over untyped API objects.
//!
//! Listings come back as `serde_json::Value` trees. Callers only pull the
//! fields they need and every accessor tolerates absence.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::constants::{STATUS_NOT_READY, STATUS_READY, STATUS_UNKNOWN};

/// Walk a chain of object keys.
pub fn nested<'a>(obj: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields.iter().try_fold(obj, |current, field| current.as_object()?.get(*field))
}

/// Walk a chain of object keys and read a non-empty string at the end.
pub fn nested_str<'a>(obj: &'a Value, fields: &[&str]) -> Option<&'a str> {
    nested(obj, fields).and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub fn name(obj: &Value) -> String {
    nested_str(obj, &["metadata", "name"]).unwrap_or_default().to_string()
}

pub fn namespace(obj: &Value) -> Option<String> {
    nested_str(obj, &["metadata", "namespace"]).map(str::to_string)
}

pub fn kind(obj: &Value) -> String {
    nested_str(obj, &["kind"]).unwrap_or_default().to_string()
}

pub fn labels(obj: &Value) -> BTreeMap<String, String> {
    string_map(nested(obj, &["metadata", "labels"]))
}

pub fn annotation<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    nested(obj, &["metadata", "annotations"])?.get(key)?.as_str().filter(|s| !s.is_empty())
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|map| map.iter().filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string()))).collect())
        .unwrap_or_default()
}

/// Summarise an object's health in one word.
///
/// Order of precedence: `status.phase`, then the `Ready` condition
/// (`True` → Ready, anything else → NotReady), then the type of the last
/// condition, then `Unknown`.
pub fn derive_status(obj: &Value) -> String {
    let Some(status) = obj.get("status").and_then(Value::as_object) else {
        return STATUS_UNKNOWN.to_string();
    };

    if let Some(phase) = status.get("phase").and_then(Value::as_str)
        && !phase.is_empty()
    {
        return phase.to_string();
    }

    let conditions = match status.get("conditions").and_then(Value::as_array) {
        Some(conditions) if !conditions.is_empty() => conditions,
        _ => return STATUS_UNKNOWN.to_string(),
    };

    for condition in conditions {
        if condition.get("type").and_then(Value::as_str) == Some(STATUS_READY)
            && let Some(state) = condition.get("status").and_then(Value::as_str)
        {
            return if state == "True" { STATUS_READY } else { STATUS_NOT_READY }.to_string();
        }
    }

    conditions
        .last()
        .and_then(|last| last.get("type"))
        .and_then(Value::as_str)
        .unwrap_or(STATUS_UNKNOWN)
        .to_string()
}
