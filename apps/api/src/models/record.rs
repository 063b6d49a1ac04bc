use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// Keys the server owns. Client documents never set them directly.
pub const RESERVED_KEYS: [&str; 3] = ["id", "submittedAt", "viewed"];

/// A schema-less document with the server-managed envelope fields.
///
/// Serializes flat: the document fields plus `id`, `submittedAt` and `viewed`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Record {
    pub id: Uuid,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
    pub viewed: bool,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Record {
    /// Returns a string field from the document, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RecordRow {
    pub id: Uuid,
    pub data: Value,
    pub viewed: bool,
    pub submitted_at: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        let data = match row.data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Record {
            id: row.id,
            submitted_at: row.submitted_at,
            viewed: row.viewed,
            data,
        }
    }
}

/// Removes the server-owned keys from a client document.
pub fn strip_reserved(mut doc: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        doc.remove(key);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_serializes_flat() {
        let mut data = Map::new();
        data.insert("firstName".to_string(), json!("Ada"));
        let record = Record {
            id: Uuid::nil(),
            submitted_at: DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
            viewed: false,
            data,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["viewed"], false);
        assert_eq!(value["id"], Uuid::nil().to_string());
        assert_eq!(value["submittedAt"], "2025-01-02T03:04:05Z");
    }

    #[test]
    fn test_strip_reserved_drops_envelope_keys_only() {
        let doc = json!({
            "id": "spoofed",
            "submittedAt": "yesterday",
            "viewed": true,
            "email": "a@b.c"
        });
        let Value::Object(map) = doc else { unreachable!() };
        let stripped = strip_reserved(map);
        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped["email"], "a@b.c");
    }

    #[test]
    fn test_row_with_non_object_data_becomes_empty_document() {
        let row = RecordRow {
            id: Uuid::nil(),
            data: json!("not an object"),
            viewed: true,
            submitted_at: Utc::now(),
        };
        let record = Record::from(row);
        assert!(record.data.is_empty());
        assert!(record.viewed);
    }
}
