use serde_json::Value;

use crate::error::EmpresasResult;

/// Whole-document persistence for the collection.
///
/// Elements are kept as raw JSON: the store never validates them, that is
/// the service's job.
pub trait CollectionStore: Send + Sync {
    /// Read the collection, creating an empty one if none exists yet.
    fn load(&self) -> EmpresasResult<Vec<Value>>;

    /// Overwrite the persisted collection.
    fn save(&self, collection: &[Value]) -> EmpresasResult<()>;
}
