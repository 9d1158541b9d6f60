//! Helpers for picking apart server response bodies.

use bh_core::ModelId;
use serde_json::Value;

/// Find the model identifier in an upload response.
///
/// Servers have answered with `{"model_id": ..}`, `{"id": ..}` and
/// `{"model": {"_id": ..}}`; the first non-blank one wins.
pub fn extract_model_id(body: &Value) -> Option<ModelId> {
    let candidates = [
        body.get("model_id"),
        body.get("id"),
        body.get("model").and_then(|m| m.get("_id")),
        body.get("model").and_then(|m| m.get("id")),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            Value::String(s) => ModelId::from_input(s),
            Value::Number(n) => ModelId::from_input(&n.to_string()),
            _ => None,
        })
}

/// Human-readable `detail` from an error body, if the server sent one.
///
/// `detail` is either a message string or a list of validation errors with a
/// `msg` field each.
pub fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let detail = value.get("detail")?;
    let text = match detail {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.get("msg") {
                Some(Value::String(msg)) => msg.clone(),
                _ => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::Null => return None,
        other => other.to_string(),
    };
    (!text.trim().is_empty()).then_some(text)
}
