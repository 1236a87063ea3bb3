//! Repair of a collection written by older versions or edited by hand.

use std::collections::HashSet;

use serde_json::Value;

use crate::record::{element_id, Record, MAX_ID};

/// Outcome of [`normalize_collection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub records: Vec<Record>,
    /// Elements that had a missing or mistyped field filled in.
    pub repaired: usize,
    /// Elements whose id collided with an earlier one.
    pub renumbered: usize,
    /// The document was not an array and was discarded.
    pub reset: bool,
}

/// Coerce any JSON document into a well-formed collection.
///
/// Each element keeps its fields when they have the right type and gets
/// defaults otherwise (`id` falls back to its 1-based position). When ids
/// collide the first occurrence keeps its id and later ones are renumbered
/// past the current maximum, or into the lowest free id once the maximum
/// reaches `MAX_ID`.
pub fn normalize_collection(document: &Value) -> Normalized {
    let Some(items) = document.as_array() else {
        return Normalized {
            records: Vec::new(),
            repaired: 0,
            renumbered: 0,
            reset: true,
        };
    };

    let mut repaired = 0;
    let mut records: Vec<Record> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let (record, fixed) = repair(item, i as u64 + 1);
            if fixed {
                repaired += 1;
            }
            record
        })
        .collect();

    let mut max_id = records.iter().map(|r| r.id).max().unwrap_or(0);
    let mut taken: HashSet<u64> = records.iter().map(|r| r.id).collect();
    let mut seen = HashSet::new();
    let mut renumbered = 0;
    for record in &mut records {
        if seen.insert(record.id) {
            continue;
        }
        let fresh = if max_id < MAX_ID {
            max_id += 1;
            Some(max_id)
        } else {
            (1..=MAX_ID).find(|id| !taken.contains(id))
        };
        if let Some(id) = fresh {
            record.id = id;
            taken.insert(id);
            seen.insert(id);
            renumbered += 1;
        }
    }

    Normalized {
        records,
        repaired,
        renumbered,
        reset: false,
    }
}

fn repair(item: &Value, fallback_id: u64) -> (Record, bool) {
    let text = |field: &str| item.get(field).and_then(Value::as_str).map(String::from);

    let id = element_id(item);
    let empresa = text("empresa");
    let site = text("site");
    let concluido = item.get("concluido").and_then(Value::as_bool);

    let fixed = id.is_none()
        || empresa.is_none()
        || site.is_none()
        || concluido.is_none()
        || item.as_object().is_some_and(|o| o.len() != 4);

    let record = Record {
        id: id.unwrap_or(fallback_id),
        empresa: empresa.unwrap_or_default(),
        site: site.unwrap_or_default(),
        concluido: concluido.unwrap_or(false),
    };
    (record, fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(n: &Normalized) -> Vec<u64> {
        n.records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_well_formed_collection_untouched() {
        let doc = json!([
            {"id": 1, "empresa": "A", "site": "a.com", "concluido": false},
            {"id": 5, "empresa": "B", "site": "b.com", "concluido": true}
        ]);
        let n = normalize_collection(&doc);
        assert_eq!(ids(&n), vec![1, 5]);
        assert_eq!(n.repaired, 0);
        assert_eq!(n.renumbered, 0);
        assert!(!n.reset);
    }

    #[test]
    fn test_fills_missing_fields() {
        let doc = json!([{"empresa": "A"}, {"id": 3, "site": 42, "concluido": "yes"}]);
        let n = normalize_collection(&doc);
        assert_eq!(n.repaired, 2);
        assert_eq!(
            n.records[0],
            Record {
                id: 1,
                empresa: "A".into(),
                site: String::new(),
                concluido: false
            }
        );
        assert_eq!(n.records[1].site, "");
        assert!(!n.records[1].concluido);
    }

    #[test]
    fn test_non_object_elements_become_defaults() {
        let n = normalize_collection(&json!([null, "x"]));
        assert_eq!(ids(&n), vec![1, 2]);
        assert_eq!(n.repaired, 2);
    }

    #[test]
    fn test_duplicate_ids_renumbered_after_max() {
        let doc = json!([
            {"id": 2, "empresa": "A", "site": "a", "concluido": false},
            {"id": 2, "empresa": "B", "site": "b", "concluido": false},
            {"id": 7, "empresa": "C", "site": "c", "concluido": false},
            {"id": 7, "empresa": "D", "site": "d", "concluido": false}
        ]);
        let n = normalize_collection(&doc);
        assert_eq!(ids(&n), vec![2, 8, 7, 9]);
        assert_eq!(n.renumbered, 2);
    }

    #[test]
    fn test_positional_fallback_collides_with_explicit_id() {
        // Second element has no id and falls back to 2, which is taken.
        let doc = json!([
            {"id": 2, "empresa": "A", "site": "a", "concluido": false},
            {"empresa": "B", "site": "b", "concluido": false}
        ]);
        let n = normalize_collection(&doc);
        assert_eq!(ids(&n), vec![2, 3]);
    }

    #[test]
    fn test_ids_out_of_range_fall_back_to_position() {
        let doc = json!([
            {"id": 18446744073709551615u64, "empresa": "A", "site": "a", "concluido": false},
            {"id": 1, "empresa": "B", "site": "b", "concluido": false}
        ]);
        let n = normalize_collection(&doc);
        assert_eq!(ids(&n), vec![1, 2]);
        assert_eq!(n.repaired, 1);
        assert_eq!(n.renumbered, 1);
    }

    #[test]
    fn test_duplicates_at_max_id_take_lowest_free() {
        let doc = json!([
            {"id": MAX_ID, "empresa": "A", "site": "a", "concluido": false},
            {"id": MAX_ID, "empresa": "B", "site": "b", "concluido": false},
            {"id": 1, "empresa": "C", "site": "c", "concluido": false}
        ]);
        let n = normalize_collection(&doc);
        assert_eq!(ids(&n), vec![MAX_ID, 2, 1]);
        assert_eq!(n.renumbered, 1);
    }

    #[test]
    fn test_non_array_document_resets() {
        let n = normalize_collection(&json!({"id": 1}));
        assert!(n.reset);
        assert!(n.records.is_empty());
    }
}
