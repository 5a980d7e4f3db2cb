//! In-memory storage backend
//!
//! Keeps the inventory in process. Used for tests and throwaway sessions.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::traits::{BackendType, PartStore};
use crate::models::{Inventory, SparePart};

/// Memory backend implementation
pub struct MemoryBackend {
    path: PathBuf,
    inventory: Mutex<Inventory>,
}

impl MemoryBackend {
    /// Creates an empty memory backend
    pub fn new() -> Self {
        Self::with_inventory(Inventory::new())
    }

    /// Creates a memory backend holding `inventory`
    pub fn with_inventory(inventory: Inventory) -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            inventory: Mutex::new(inventory),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inventory>> {
        self.inventory
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PartStore for MemoryBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Inventory> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        *self.lock()? = inventory.clone();
        Ok(())
    }

    fn find_by_key(&self, part_id: &str) -> Result<Option<SparePart>> {
        Ok(self.lock()?.find(part_id).map(|d| d.part.clone()))
    }

    fn insert(&self, part: &SparePart) -> Result<()> {
        self.lock()?.insert(part.clone());
        Ok(())
    }

    fn update_by_key(&self, part_id: &str, fields: &SparePart) -> Result<usize> {
        Ok(self.lock()?.update(part_id, fields))
    }

    fn delete_by_key(&self, part_id: &str) -> Result<usize> {
        Ok(self.lock()?.delete(part_id))
    }

    fn exists(&self) -> bool {
        true
    }
}
