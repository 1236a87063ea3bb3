pub mod error;
pub mod migrate;
pub mod record;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{EmpresasError, EmpresasResult, ValidationError};
pub use migrate::{normalize_collection, Normalized};
pub use record::{next_id, NewRecord, Record, MAX_ID};
pub use service::RecordService;
pub use store::CollectionStore;
