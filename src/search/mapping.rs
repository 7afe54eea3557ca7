//! Schema-driven mapping of JSON records

use crate::search::document::{DocumentMapper, FieldKind, FieldSet, FieldValue, IndexSchema};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Maps JSON objects to field sets by the declared schema.
///
/// Keys that are not declared, and values that do not fit the declared kind, are skipped.
/// Text fields accept strings, numbers and booleans. Date fields accept RFC 3339 strings
/// or epoch milliseconds.
#[derive(Debug, Clone)]
pub struct JsonDocumentMapper {
    schema: IndexSchema,
}

impl JsonDocumentMapper {
    pub fn new(schema: IndexSchema) -> Self {
        Self { schema }
    }
}

impl DocumentMapper<Value> for JsonDocumentMapper {
    fn schema(&self) -> IndexSchema {
        self.schema.clone()
    }

    fn to_fields(&self, record: &Value) -> FieldSet {
        let mut fields = FieldSet::new();
        let Some(object) = record.as_object() else {
            return fields;
        };
        for def in self.schema.fields() {
            if let Some(value) = object.get(&def.name).and_then(|v| convert(v, def.kind)) {
                fields.insert(def.name.clone(), value);
            }
        }
        fields
    }
}

fn convert(value: &Value, kind: FieldKind) -> Option<FieldValue> {
    match kind {
        FieldKind::Exact => text(value).map(FieldValue::Exact),
        FieldKind::Analyzed => text(value).map(FieldValue::Analyzed),
        FieldKind::I64 => value.as_i64().map(FieldValue::I64),
        FieldKind::Date => date(value).map(FieldValue::Date),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn mapper() -> JsonDocumentMapper {
        JsonDocumentMapper::new(
            IndexSchema::new("id")
                .exact("name")
                .analyzed("desc")
                .i64("born")
                .date("updated_at"),
        )
    }

    #[test]
    fn test_maps_declared_fields_by_kind() {
        let fields = mapper().to_fields(&json!({
            "id": 17,
            "name": "Li Bai",
            "desc": "poet of the moon",
            "born": 701,
            "updated_at": "2024-11-24T08:00:00+08:00",
            "dynasty": "Tang"
        }));

        assert_eq!(fields.get("id"), Some(&FieldValue::Exact("17".to_string())));
        assert_eq!(fields.text("desc"), Some("poet of the moon"));
        assert_eq!(fields.get("born"), Some(&FieldValue::I64(701)));
        assert_eq!(
            fields.get("updated_at"),
            Some(&FieldValue::Date(
                Utc.with_ymd_and_hms(2024, 11, 24, 0, 0, 0).unwrap()
            ))
        );
        assert!(fields.get("dynasty").is_none());
    }

    #[test]
    fn test_date_from_epoch_millis() {
        let fields = mapper().to_fields(&json!({"id": "1", "updated_at": 0}));
        assert_eq!(
            fields.get("updated_at"),
            Some(&FieldValue::Date(DateTime::from_timestamp_millis(0).unwrap()))
        );
    }

    #[test]
    fn test_mismatched_values_are_skipped() {
        let fields = mapper().to_fields(&json!({
            "id": "1",
            "born": "seven hundred",
            "updated_at": "yesterday",
            "desc": ["not", "text"]
        }));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_non_object_maps_to_nothing() {
        assert!(mapper().to_fields(&json!("just text")).is_empty());
    }
}
