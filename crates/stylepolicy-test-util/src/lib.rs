//! Shared test utilities for the stylepolicy workspace.
//!
//! `xtask` needs these at runtime, so they cannot live behind `#[cfg(test)]`
//! in `stylepolicy-types`.

use serde_json::Value;

const TIMESTAMP_KEYS: &[&str] = &["started_at", "finished_at"];

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// `tool.version` is replaced with `"__VERSION__"` only when the root object
/// is a check report (has `schema`, `tool`, `run`, `status` and `files`), so
/// nested data with the same key names is left alone.
///
/// Timestamps and `duration_ms` are normalized at any depth; their
/// placeholder values cannot collide with real diagnostics.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_report = ["schema", "tool", "run", "status", "files"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_report
            && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool.contains_key("version")
        {
            tool.insert(
                "version".to_string(),
                Value::String("__VERSION__".to_string()),
            );
        }
    }
    normalize_run_recursive(&mut value);
    value
}

fn normalize_run_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in TIMESTAMP_KEYS {
                if let Some(slot) = map.get_mut(*key) {
                    *slot = Value::String("__TIMESTAMP__".to_string());
                }
            }
            if let Some(slot) = map.get_mut("duration_ms") {
                *slot = Value::Number(0.into());
            }
            for val in map.values_mut() {
                normalize_run_recursive(val);
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(normalize_run_recursive),
        _ => {}
    }
}

/// `path:line:column rule_id` for every diagnostic in a serialized check
/// report, in report order. Handy for asserting on shape without messages.
pub fn diagnostic_locations(report: &Value) -> Vec<String> {
    let mut out = Vec::new();
    let files = report["files"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    for file in files {
        let path = file["path"].as_str().unwrap_or_default();
        let diagnostics = file["diagnostics"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for d in diagnostics {
            out.push(format!(
                "{}:{}:{} {}",
                path,
                d["position"]["line"],
                d["position"]["column"],
                d["rule_id"].as_str().unwrap_or_default()
            ));
        }
    }
    out
}
