mod migrate;
mod store;

pub use migrate::{migrate_file, MigrationReport};
pub use store::JsonFileStore;
