//! YAML file storage backend
//!
//! This backend stores the inventory in a single YAML file through
//! [`Storage`], so every keyed operation runs under the file lock.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::traits::{BackendType, PartStore};
use crate::models::{Inventory, SparePart};
use crate::storage::Storage;

/// YAML file backend implementation
pub struct YamlBackend {
    storage: Storage,
    path: PathBuf,
}

impl YamlBackend {
    /// Creates a new YAML backend for the given file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            storage: Storage::new(&path),
            path,
        }
    }
}

impl PartStore for YamlBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Yaml
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Inventory> {
        self.storage.load()
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        self.storage.save(inventory)
    }

    fn insert(&self, part: &SparePart) -> Result<()> {
        self.storage.update_atomically(|inventory| {
            inventory.insert(part.clone());
        })
    }

    fn update_by_key(&self, part_id: &str, fields: &SparePart) -> Result<usize> {
        self.storage
            .update_atomically(|inventory| inventory.update(part_id, fields))
    }

    fn delete_by_key(&self, part_id: &str) -> Result<usize> {
        self.storage
            .update_atomically(|inventory| inventory.delete(part_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_yaml_backend_create_and_load() {
        // Use a path that doesn't exist yet
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.yaml");
        let backend = YamlBackend::new(&file_path);

        backend.create_if_not_exists().unwrap();

        let inventory = backend.load().unwrap();
        assert!(inventory.parts.is_empty());
    }

    #[test]
    fn test_yaml_backend_save_and_load() {
        let temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let backend = YamlBackend::new(temp_file.path());

        let mut inventory = Inventory::new();
        inventory.name = "Workshop".to_string();
        inventory.insert(SparePart::new("P1", "Brake Pad", "Civic", 49.99, 10));

        backend.save(&inventory).unwrap();

        let loaded = backend.load().unwrap();
        assert_eq!(loaded, inventory);
    }

    #[test]
    fn test_yaml_backend_part_crud() {
        let temp_dir = TempDir::new().unwrap();
        let backend = YamlBackend::new(temp_dir.path().join("parts.yaml"));
        let part = SparePart::new("P1", "Brake Pad", "Civic", 49.99, 10);

        backend.insert(&part).unwrap();
        assert_eq!(backend.find_by_key("P1").unwrap(), Some(part.clone()));

        let mut cheaper = part.clone();
        cheaper.price = 39.99;
        assert_eq!(backend.update_by_key("P1", &cheaper).unwrap(), 1);
        assert_eq!(backend.update_by_key("P1", &cheaper).unwrap(), 0);
        assert_eq!(backend.update_by_key("P2", &cheaper).unwrap(), 0);

        // A fresh backend on the same file sees the change
        let reopened = YamlBackend::new(backend.path());
        assert_eq!(reopened.find_all().unwrap(), vec![cheaper]);

        assert_eq!(backend.delete_by_key("P1").unwrap(), 1);
        assert_eq!(backend.delete_by_key("P1").unwrap(), 0);
        assert!(reopened.find_all().unwrap().is_empty());
    }
}
