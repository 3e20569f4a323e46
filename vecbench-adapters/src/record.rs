//! Deriving record ids, documents and metadata from benchmark payloads.
//!
//! Benchmark payloads are free-form JSON objects. Databases want a string id,
//! optionally a document text, and metadata restricted to scalar values.

use serde_json::Value;

use crate::Payload;

/// Payload field used as the record id.
pub const ROW_ID_FIELD: &str = "row_id";

/// Record id: the payload's `row_id` rendered as a string, else the record's
/// position in the upsert call.
pub fn record_id(payload: &Payload, index: usize) -> String {
    match payload.get(ROW_ID_FIELD) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => index.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Document text: the payload's `text`, else `Track: <track>`.
pub fn record_document(payload: &Payload) -> String {
    if let Some(text) = payload.get("text") {
        return display_value(text);
    }
    let track = payload
        .get("track")
        .map(display_value)
        .unwrap_or_else(|| "Unknown".to_string());
    format!("Track: {}", track)
}

/// Metadata with nulls dropped and arrays/objects flattened to JSON strings.
pub fn scalar_metadata(payload: &Payload) -> Payload {
    payload
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let value = match value {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => value.clone(),
                other => Value::String(other.to_string()),
            };
            (key.clone(), value)
        })
        .collect()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
