use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{EmpresasError, EmpresasResult, ValidationError};
use crate::record::{element_id, next_id, Record, MAX_ID};
use crate::store::CollectionStore;
use crate::validate;

/// Validated record lifecycle on top of a [`CollectionStore`].
///
/// Every operation reads the whole collection and, when it mutates, writes
/// the whole collection back. The cycle runs under a lock, so concurrent
/// callers sharing one service never lose each other's updates. Positions
/// passed to [`edit_at`](Self::edit_at) and [`delete_at`](Self::delete_at)
/// refer to the collection as it is when the call runs.
pub struct RecordService<S> {
    store: S,
    lock: Mutex<()>,
}

impl<S: CollectionStore> RecordService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list(&self) -> EmpresasResult<Vec<Value>> {
        let _guard = self.guard();
        self.store.load()
    }

    pub fn create(&self, candidate: &Value) -> EmpresasResult<Record> {
        let new = validate::new_record(candidate)?;

        let _guard = self.guard();
        let mut collection = self.store.load()?;
        let record = new.into_record(reserve_ids(&collection, 1)?);
        collection.push(serde_json::to_value(&record)?);
        self.store.save(&collection)?;

        info!(id = record.id, "created record");
        Ok(record)
    }

    /// Replace the whole collection with fully specified records.
    /// Nothing is written unless every element is valid.
    pub fn replace_all(&self, data: &Value) -> EmpresasResult<usize> {
        let items = validate::require_array(data, "data")?;
        let records = validate::each(items, validate::full_record)?;

        let mut seen = HashSet::new();
        for (i, record) in records.iter().enumerate() {
            if !seen.insert(record.id) {
                return Err(ValidationError::new("id", format!("duplicates id {}", record.id))
                    .at(i)
                    .into());
            }
        }

        let collection = to_values(&records)?;
        let _guard = self.guard();
        self.store.save(&collection)?;

        info!(count = collection.len(), "replaced collection");
        Ok(collection.len())
    }

    /// Append many new records, numbered after the current maximum id.
    pub fn add_multiple(&self, data: &Value) -> EmpresasResult<usize> {
        let items = validate::require_array(data, "data")?;
        let new = validate::each(items, validate::new_record)?;

        let _guard = self.guard();
        let mut collection = self.store.load()?;
        let first_id = reserve_ids(&collection, new.len())?;
        let added = new
            .into_iter()
            .zip(first_id..)
            .map(|(n, id)| n.into_record(id))
            .collect::<Vec<_>>();
        collection.extend(to_values(&added)?);
        self.store.save(&collection)?;

        info!(added = added.len(), first_id, "added records");
        Ok(added.len())
    }

    pub fn clear_all(&self) -> EmpresasResult<()> {
        let _guard = self.guard();
        self.store.save(&[])?;
        info!("cleared collection");
        Ok(())
    }

    /// Overwrite the record at `index`, keeping its stored id.
    pub fn edit_at(&self, index: i64, updated: &Value) -> EmpresasResult<Record> {
        let _guard = self.guard();
        let mut collection = self.store.load()?;
        let pos = position(index, collection.len())?;

        // Elements from a raw import may lack an id; give them a fresh one.
        let id = match element_id(&collection[pos]) {
            Some(id) => id,
            None => reserve_ids(&collection, 1)?,
        };
        let record = validate::edited_record(updated, id)?;
        collection[pos] = serde_json::to_value(&record)?;
        self.store.save(&collection)?;

        info!(index, id, "edited record");
        Ok(record)
    }

    pub fn delete_at(&self, index: i64) -> EmpresasResult<Value> {
        let _guard = self.guard();
        let mut collection = self.store.load()?;
        let pos = position(index, collection.len())?;
        let removed = collection.remove(pos);
        self.store.save(&collection)?;

        info!(index, "deleted record");
        Ok(removed)
    }

    /// Set the completion flag of the first record whose id matches.
    pub fn update_completion(&self, id: u64, concluido: &Value) -> EmpresasResult<Value> {
        let Value::Bool(concluido) = *concluido else {
            return Err(ValidationError::new("concluido", "must be a boolean").into());
        };

        let _guard = self.guard();
        let mut collection = self.store.load()?;
        let element = collection
            .iter_mut()
            .find(|e| element_id(e) == Some(id))
            .ok_or_else(|| EmpresasError::NotFound(format!("no record with id {id}")))?;
        if let Some(fields) = element.as_object_mut() {
            fields.insert("concluido".into(), Value::Bool(concluido));
        }
        let updated = element.clone();
        self.store.save(&collection)?;

        info!(id, concluido, "updated completion");
        Ok(updated)
    }

    /// Replace the collection with a JSON document supplied as text.
    ///
    /// Only the shape is checked (an array of objects); fields are stored
    /// as given.
    pub fn import_raw_json(&self, text: &str) -> EmpresasResult<usize> {
        let parsed: Value = serde_json::from_str(text).map_err(|e| {
            ValidationError::new("jsonContent", format!("is not valid JSON: {e}"))
        })?;
        let items = validate::require_array(&parsed, "jsonContent")?;
        if let Some(i) = items.iter().position(|item| !item.is_object()) {
            return Err(ValidationError::new("jsonContent", "must contain only objects")
                .at(i)
                .into());
        }

        let _guard = self.guard();
        self.store.save(items)?;

        debug!(bytes = text.len(), "imported raw json");
        info!(count = items.len(), "imported collection");
        Ok(items.len())
    }
}

fn position(index: i64, len: usize) -> EmpresasResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| EmpresasError::NotFound(format!("no record at index {index}")))
}

/// First of `count` consecutive unused ids, all within `MAX_ID`.
fn reserve_ids(collection: &[Value], count: usize) -> EmpresasResult<u64> {
    let exhausted = || ValidationError::new("id", format!("no ids left below {MAX_ID}"));
    let first = next_id(collection).ok_or_else(exhausted)?;
    let span = u64::try_from(count.saturating_sub(1)).map_err(|_| exhausted())?;
    first
        .checked_add(span)
        .filter(|last| *last <= MAX_ID)
        .ok_or_else(exhausted)?;
    Ok(first)
}

fn to_values(records: &[Record]) -> EmpresasResult<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(EmpresasError::from))
        .collect()
}
