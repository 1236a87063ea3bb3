//! Field checks shared by every operation that accepts client records.
//!
//! Checks run on raw JSON so that the error can name the exact field that
//! is missing or has the wrong type.

use serde_json::Value;

use crate::error::ValidationError;
use crate::record::{NewRecord, Record, MAX_ID};

pub fn require_text(item: &Value, field: &str) -> Result<String, ValidationError> {
    match item.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(ValidationError::new(field, "must not be empty")),
        Some(_) => Err(ValidationError::new(field, "must be a string")),
        None => Err(ValidationError::new(field, "is required")),
    }
}

pub fn require_bool(item: &Value, field: &str) -> Result<bool, ValidationError> {
    match item.get(field) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ValidationError::new(field, "must be a boolean")),
        None => Err(ValidationError::new(field, "is required")),
    }
}

pub fn require_id(item: &Value) -> Result<u64, ValidationError> {
    match item.get("id") {
        Some(v) => v
            .as_u64()
            .filter(|id| (1..=MAX_ID).contains(id))
            .ok_or_else(|| {
                ValidationError::new("id", format!("must be an integer between 1 and {MAX_ID}"))
            }),
        None => Err(ValidationError::new("id", "is required")),
    }
}

pub fn require_array<'a>(value: &'a Value, field: &str) -> Result<&'a [Value], ValidationError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ValidationError::new(field, "must be an array"))
}

/// Fields accepted on create and bulk add. Any client `id` or `concluido`
/// is ignored.
pub fn new_record(item: &Value) -> Result<NewRecord, ValidationError> {
    Ok(NewRecord {
        empresa: require_text(item, "empresa")?,
        site: require_text(item, "site")?,
    })
}

/// A record submitted with every field, as in replace-all.
pub fn full_record(item: &Value) -> Result<Record, ValidationError> {
    Ok(Record {
        id: require_id(item)?,
        empresa: require_text(item, "empresa")?,
        site: require_text(item, "site")?,
        concluido: require_bool(item, "concluido")?,
    })
}

/// The editable fields of an existing record; `id` comes from the stored
/// element, never from the client.
pub fn edited_record(item: &Value, id: u64) -> Result<Record, ValidationError> {
    Ok(Record {
        id,
        empresa: require_text(item, "empresa")?,
        site: require_text(item, "site")?,
        concluido: require_bool(item, "concluido")?,
    })
}

/// Validate each element with `check`, stopping at the first failure and
/// tagging it with the element's position.
pub fn each<T>(
    items: &[Value],
    check: impl Fn(&Value) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ValidationError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| check(item).map_err(|e| e.at(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_text() {
        let item = json!({"empresa": "Acme", "blank": "  ", "num": 3});
        assert_eq!(require_text(&item, "empresa").unwrap(), "Acme");
        assert_eq!(require_text(&item, "blank").unwrap_err().reason, "must not be empty");
        assert_eq!(require_text(&item, "num").unwrap_err().reason, "must be a string");
        assert_eq!(require_text(&item, "site").unwrap_err().reason, "is required");
    }

    #[test]
    fn test_require_bool_rejects_strings() {
        let item = json!({"concluido": "true"});
        let err = require_bool(&item, "concluido").unwrap_err();
        assert_eq!(err.field, "concluido");
        assert_eq!(err.reason, "must be a boolean");
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(&json!({"id": 4})).unwrap(), 4);
        assert!(require_id(&json!({"id": 0})).is_err());
        assert!(require_id(&json!({"id": 1.5})).is_err());
        assert!(require_id(&json!({"id": "4"})).is_err());
        assert_eq!(require_id(&json!({"id": MAX_ID})).unwrap(), MAX_ID);
        assert!(require_id(&json!({"id": MAX_ID + 1})).is_err());
        assert!(require_id(&json!({"id": u64::MAX})).is_err());
        assert_eq!(require_id(&json!({})).unwrap_err().reason, "is required");
    }

    #[test]
    fn test_new_record_ignores_client_id_and_status() {
        let rec = new_record(&json!({"id": 99, "empresa": "A", "site": "a.com", "concluido": true}))
            .unwrap();
        assert_eq!(rec, NewRecord::new("A", "a.com"));
    }

    #[test]
    fn test_new_record_on_non_object() {
        let err = new_record(&json!("Acme")).unwrap_err();
        assert_eq!(err.field, "empresa");
    }

    #[test]
    fn test_full_record_checks_every_field() {
        let ok = json!({"id": 1, "empresa": "A", "site": "a.com", "concluido": true});
        assert!(full_record(&ok).unwrap().concluido);

        let missing = json!({"id": 1, "empresa": "A", "site": "a.com"});
        assert_eq!(full_record(&missing).unwrap_err().field, "concluido");
    }

    #[test]
    fn test_each_reports_first_failing_index() {
        let items = vec![
            json!({"empresa": "A", "site": "a.com"}),
            json!({"empresa": "B"}),
            json!({"site": "c.com"}),
        ];
        let err = each(&items, new_record).unwrap_err();
        assert_eq!(err.index, Some(1));
        assert_eq!(err.field, "site");
    }

    #[test]
    fn test_require_array() {
        assert_eq!(require_array(&json!([1, 2]), "data").unwrap().len(), 2);
        assert_eq!(require_array(&json!({}), "data").unwrap_err().field, "data");
    }
}
