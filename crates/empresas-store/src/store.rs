use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use empresas_core::{CollectionStore, EmpresasError, EmpresasResult};

/// Collection stored as one pretty-printed JSON array on disk.
///
/// Writes overwrite the file in place; readers in other processes may see
/// a partially written document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn ensure_dir(&self) -> EmpresasResult<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .map_err(|e| EmpresasError::Storage(format!("cannot create data directory: {e}"))),
            _ => Ok(()),
        }
    }

    /// Raw file content, or `None` when the file does not exist.
    pub(crate) fn read_raw(&self) -> EmpresasResult<Option<String>> {
        self.ensure_dir()?;
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EmpresasError::Storage(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))),
        }
    }

    pub(crate) fn write_raw(&self, content: &str) -> EmpresasResult<()> {
        self.ensure_dir()?;
        fs::write(&self.path, content).map_err(|e| {
            EmpresasError::Storage(format!("cannot write {}: {e}", self.path.display()))
        })
    }
}

impl CollectionStore for JsonFileStore {
    fn load(&self) -> EmpresasResult<Vec<Value>> {
        let Some(content) = self.read_raw()? else {
            debug!(path = %self.path.display(), "data file missing, creating empty collection");
            self.write_raw("[]")?;
            return Ok(Vec::new());
        };

        let document: Value = serde_json::from_str(&content).map_err(|e| {
            EmpresasError::Storage(format!("{} is not valid JSON: {e}", self.path.display()))
        })?;
        match document {
            Value::Array(items) => Ok(items),
            _ => Err(EmpresasError::Storage(format!(
                "{} does not contain a JSON array",
                self.path.display()
            ))),
        }
    }

    fn save(&self, collection: &[Value]) -> EmpresasResult<()> {
        let json = serde_json::to_string_pretty(collection)?;
        self.write_raw(&json)?;
        debug!(path = %self.path.display(), count = collection.len(), "saved collection");
        Ok(())
    }
}
