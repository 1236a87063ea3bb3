use serde_json::Value;
use tracing::{info, warn};

use empresas_core::{normalize_collection, EmpresasError, EmpresasResult};

use crate::store::JsonFileStore;

/// What a migration pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub total: usize,
    pub repaired: usize,
    pub renumbered: usize,
    /// The file did not exist and was created empty.
    pub created: bool,
    /// The file held valid JSON that was not an array and was emptied.
    pub reset: bool,
}

/// Rewrite the data file so every element is a well-formed record with a
/// unique id.
///
/// A file that is not valid JSON is left untouched and reported as an error.
pub fn migrate_file(store: &JsonFileStore) -> EmpresasResult<MigrationReport> {
    let Some(content) = store.read_raw()? else {
        store.write_raw("[]")?;
        info!(path = %store.path().display(), "created empty data file");
        return Ok(MigrationReport {
            created: true,
            ..Default::default()
        });
    };

    let document: Value = serde_json::from_str(&content).map_err(|e| {
        EmpresasError::Storage(format!(
            "{} is not valid JSON, leaving it untouched: {e}",
            store.path().display()
        ))
    })?;

    let normalized = normalize_collection(&document);
    if normalized.reset {
        warn!(path = %store.path().display(), "data file is not an array, starting empty");
    }

    let json = serde_json::to_string_pretty(&normalized.records)?;
    store.write_raw(&json)?;

    let report = MigrationReport {
        total: normalized.records.len(),
        repaired: normalized.repaired,
        renumbered: normalized.renumbered,
        created: false,
        reset: normalized.reset,
    };
    info!(
        total = report.total,
        repaired = report.repaired,
        renumbered = report.renumbered,
        "data migration complete"
    );
    Ok(report)
}
