//! Storage abstraction layer for the spare part inventory
//!
//! This module provides a trait-based abstraction for storage backends,
//! allowing the inventory to live in a YAML file, a SQLite database or
//! memory while the controller sees one interface.

mod memory_backend;
mod migration;
mod sqlite_backend;
mod traits;
mod yaml_backend;

pub use memory_backend::MemoryBackend;
pub use migration::{
    export_backend_to_json, export_to_json, import_from_json, import_json_to_backend, migrate,
};
pub use sqlite_backend::SqliteBackend;
pub use traits::{BackendType, DatabaseConfig, InventoryStats, PartStore};
pub use yaml_backend::YamlBackend;

use anyhow::Result;
use log::debug;
use std::path::Path;

/// Backend type named by a recognised file extension
pub fn backend_type_from_extension(path: &Path) -> Option<BackendType> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Some(BackendType::Yaml),
        Some("db") | Some("sqlite") | Some("sqlite3") => Some(BackendType::Sqlite),
        _ => None,
    }
}

/// Infers the backend type from a file extension
pub fn infer_backend_type(path: &Path) -> BackendType {
    backend_type_from_extension(path).unwrap_or(BackendType::Yaml) // Default to YAML
}

/// Creates a storage backend based on the file extension or explicit type
pub fn create_backend(path: &Path, backend_type: Option<BackendType>) -> Result<Box<dyn PartStore>> {
    let bt = backend_type.unwrap_or_else(|| infer_backend_type(path));
    debug!("Opening {} store at {:?}", bt, path);

    match bt {
        BackendType::Yaml => Ok(Box::new(YamlBackend::new(path))),
        BackendType::Sqlite => Ok(Box::new(SqliteBackend::new(path)?)),
        BackendType::Memory => Ok(Box::new(MemoryBackend::new())),
    }
}

/// Opens the backend described by `config`
pub fn open(config: &DatabaseConfig) -> Result<Box<dyn PartStore>> {
    match config.backend_type {
        BackendType::Sqlite => Ok(Box::new(SqliteBackend::open(&config.path, config.wal_mode)?)),
        other => create_backend(&config.path, Some(other)),
    }
}
