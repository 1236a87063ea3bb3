use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One company/site entry of the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub empresa: String,
    pub site: String,
    pub concluido: bool,
}

/// Client-supplied fields of a record that does not have an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub empresa: String,
    pub site: String,
}

impl NewRecord {
    pub fn new(empresa: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            empresa: empresa.into(),
            site: site.into(),
        }
    }

    /// New records always start out not completed.
    pub fn into_record(self, id: u64) -> Record {
        Record {
            id,
            empresa: self.empresa,
            site: self.site,
            concluido: false,
        }
    }
}

/// Largest id the service hands out or accepts: the biggest integer a JSON
/// number holds exactly in a double (`2^53 - 1`).
pub const MAX_ID: u64 = (1 << 53) - 1;

/// Id of a stored element, if it is an integer in `1..=MAX_ID`.
pub fn element_id(element: &Value) -> Option<u64> {
    element
        .get("id")
        .and_then(Value::as_u64)
        .filter(|id| (1..=MAX_ID).contains(id))
}

/// Next free id: one past the largest id in the collection, or 1.
/// `None` once the collection already holds `MAX_ID`.
///
/// Elements without a usable id (possible after a raw import) are ignored.
pub fn next_id(collection: &[Value]) -> Option<u64> {
    let next = collection.iter().filter_map(element_id).max().unwrap_or(0) + 1;
    (next <= MAX_ID).then_some(next)
}
