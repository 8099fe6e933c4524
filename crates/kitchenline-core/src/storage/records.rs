//! Decoding of persisted event records.

use serde_json::Value;
use tracing::warn;

use crate::error::StoreError;
use crate::schedule::KitchenEvent;

/// Decode a JSON array of event records.
///
/// Records that fail to deserialize or violate `end_time > start_time` are
/// skipped with a warning; the rest are returned in document order.
///
/// # Errors
/// Returns an error if `document` is not a JSON array.
pub fn decode_records(document: Value) -> Result<Vec<KitchenEvent>, StoreError> {
    let Value::Array(records) = document else {
        return Err(StoreError::NotAnArray(kind_of(&document).to_string()));
    };

    let mut events = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<KitchenEvent>(record) {
            Ok(event) => match event.validate() {
                Ok(()) => events.push(event),
                Err(e) => warn!(index, id = %event.id, error = %e, "skipping invalid event record"),
            },
            Err(e) => warn!(index, error = %e, "skipping malformed event record"),
        }
    }
    Ok(events)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, start: &str, end: Option<&str>) -> Value {
        json!({
            "id": id,
            "type": "cooking",
            "date": "2026-03-14",
            "startTime": start,
            "endTime": end,
            "title": "Soup",
            "participants": ["ana"],
        })
    }

    #[test]
    fn decodes_valid_records() {
        let doc = json!([
            record("a", "2026-03-14T10:00:00Z", Some("2026-03-14T11:00:00Z")),
            record("b", "2026-03-14T12:00:00Z", None),
        ]);
        let events = decode_records(doc).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].has_participant(&"ana".into()));
        assert!(events[1].end_time.is_none());
    }

    #[test]
    fn skips_malformed_and_invalid_records() {
        let doc = json!([
            record("ok", "2026-03-14T10:00:00Z", None),
            {"id": "broken"},
            record("backwards", "2026-03-14T10:00:00Z", Some("2026-03-14T09:00:00Z")),
            42,
        ]);
        let events = decode_records(doc).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_str(), "ok");
    }

    #[test]
    fn rejects_non_array_documents() {
        let err = decode_records(json!({"events": []})).unwrap_err();
        assert!(matches!(err, StoreError::NotAnArray(kind) if kind == "object"));
    }
}
