//! Store adapter traits
//!
//! This module defines the trait every spare part store implements.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{Inventory, SparePart};

/// Types of storage backends available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// YAML file storage (single file)
    Yaml,
    /// SQLite database storage
    Sqlite,
    /// In-process storage, lost on exit
    Memory,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Yaml => write!(f, "YAML"),
            BackendType::Sqlite => write!(f, "SQLite"),
            BackendType::Memory => write!(f, "Memory"),
        }
    }
}

/// Configuration for storage backends
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file
    pub path: PathBuf,
    /// Backend type
    pub backend_type: BackendType,
    /// Whether to enable write-ahead logging (SQLite only)
    pub wal_mode: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(crate::config::LOCAL_DB_FILE),
            backend_type: BackendType::Yaml,
            wal_mode: true,
        }
    }
}

/// The persistence boundary for spare parts
///
/// - `load()` and `save()` move the whole inventory at once
/// - the keyed operations work on a single document by `part_id`
/// - the keyed operations default to load/modify/save; backends with
///   native queries override them
///
/// Listing order is whatever the backend iterates in. Callers must not
/// rely on it being insertion order.
pub trait PartStore: Send + Sync {
    /// Returns the backend type
    fn backend_type(&self) -> BackendType;

    /// Returns the path to the backing file
    fn path(&self) -> &Path;

    // =========================================================================
    // Whole Inventory Operations
    // =========================================================================

    /// Loads the entire inventory
    fn load(&self) -> Result<Inventory>;

    /// Replaces the stored inventory
    fn save(&self, inventory: &Inventory) -> Result<()>;

    // =========================================================================
    // Keyed Document Operations
    // =========================================================================

    /// Lists every stored part
    fn find_all(&self) -> Result<Vec<SparePart>> {
        Ok(self.load()?.records())
    }

    /// Gets a part by its part ID
    fn find_by_key(&self, part_id: &str) -> Result<Option<SparePart>> {
        let inventory = self.load()?;
        Ok(inventory.find(part_id).map(|d| d.part.clone()))
    }

    /// Stores a new part
    fn insert(&self, part: &SparePart) -> Result<()> {
        let mut inventory = self.load()?;
        inventory.insert(part.clone());
        self.save(&inventory)
    }

    /// Overwrites the part stored under `part_id`.
    /// Returns the number of documents modified (0 if absent or unchanged).
    fn update_by_key(&self, part_id: &str, fields: &SparePart) -> Result<usize> {
        let mut inventory = self.load()?;
        let modified = inventory.update(part_id, fields);
        if modified > 0 {
            self.save(&inventory)?;
        }
        Ok(modified)
    }

    /// Deletes the part stored under `part_id`, returning the number deleted
    fn delete_by_key(&self, part_id: &str) -> Result<usize> {
        let mut inventory = self.load()?;
        let deleted = inventory.delete(part_id);
        if deleted > 0 {
            self.save(&inventory)?;
        }
        Ok(deleted)
    }

    // =========================================================================
    // Utility Operations
    // =========================================================================

    /// Returns true if the backing file exists
    fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Creates an empty store if it doesn't exist
    fn create_if_not_exists(&self) -> Result<()> {
        if !self.exists() {
            self.save(&Inventory::new())?;
        }
        Ok(())
    }

    /// Returns statistics about the store
    fn stats(&self) -> Result<InventoryStats> {
        let inventory = self.load()?;
        Ok(InventoryStats {
            part_count: inventory.parts.len(),
            total_units: inventory.total_units(),
            stock_value: inventory.stock_value(),
            backend_type: self.backend_type(),
        })
    }
}

/// Statistics about a store
#[derive(Debug, Clone)]
pub struct InventoryStats {
    pub part_count: usize,
    pub total_units: u64,
    pub stock_value: f64,
    pub backend_type: BackendType,
}
