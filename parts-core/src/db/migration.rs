//! Migration utilities for converting between storage backends
//!
//! This module copies inventories between YAML and SQLite backends and
//! imports/exports JSON snapshots.

use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use super::traits::PartStore;
use crate::models::Inventory;

/// Copies the whole inventory from `source` into `destination`,
/// replacing whatever the destination held.
///
/// # Returns
/// The number of parts copied
pub fn migrate(source: &dyn PartStore, destination: &dyn PartStore) -> Result<usize> {
    let inventory = source
        .load()
        .with_context(|| format!("Failed to load {} store {:?}", source.backend_type(), source.path()))?;

    let count = inventory.parts.len();

    destination.save(&inventory).with_context(|| {
        format!(
            "Failed to save to {} store {:?}",
            destination.backend_type(),
            destination.path()
        )
    })?;

    info!(
        "Migrated {} part(s) from {:?} to {:?}",
        count,
        source.path(),
        destination.path()
    );
    Ok(count)
}

/// Exports an inventory to a pretty-printed JSON file
pub fn export_to_json<P: AsRef<Path>>(inventory: &Inventory, json_path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(inventory).context("Failed to serialize to JSON")?;

    std::fs::write(json_path, json).context("Failed to write JSON file")?;

    Ok(())
}

/// Imports an inventory from a JSON file
pub fn import_from_json<P: AsRef<Path>>(json_path: P) -> Result<Inventory> {
    let json = std::fs::read_to_string(json_path).context("Failed to read JSON file")?;

    let inventory: Inventory = serde_json::from_str(&json).context("Failed to parse JSON")?;
    inventory.validate_unique_part_ids()?;

    Ok(inventory)
}

/// Exports data from any backend to a JSON file
pub fn export_backend_to_json<P: AsRef<Path>>(
    backend: &dyn PartStore,
    json_path: P,
) -> Result<usize> {
    let inventory = backend.load()?;
    export_to_json(&inventory, json_path)?;
    Ok(inventory.parts.len())
}

/// Imports a JSON file into any backend, replacing its contents
pub fn import_json_to_backend<P: AsRef<Path>>(
    json_path: P,
    backend: &dyn PartStore,
) -> Result<usize> {
    let inventory = import_from_json(json_path)?;
    backend.save(&inventory)?;
    Ok(inventory.parts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryBackend, SqliteBackend, YamlBackend};
    use crate::models::SparePart;
    use tempfile::{NamedTempFile, TempDir};

    fn sample_inventory() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.name = "Migration Test".to_string();
        inventory.insert(SparePart::new("P1", "Brake Pad", "Civic", 49.99, 10));
        inventory.insert(SparePart::new("P2", "Timing Belt", "Corolla", 120.0, 2));
        inventory
    }

    #[test]
    fn test_yaml_to_sqlite_migration() {
        let temp_dir = TempDir::new().unwrap();
        let yaml_path = temp_dir.path().join("inventory.yaml");
        let sqlite_file = NamedTempFile::with_suffix(".db").unwrap();

        YamlBackend::new(&yaml_path).save(&sample_inventory()).unwrap();

        let yaml = YamlBackend::new(&yaml_path);
        let sqlite = SqliteBackend::new(sqlite_file.path()).unwrap();
        let count = migrate(&yaml, &sqlite).unwrap();
        assert_eq!(count, 2);

        let loaded = sqlite.load().unwrap();
        assert_eq!(loaded.name, "Migration Test");
        assert_eq!(loaded.records(), sample_inventory().records());
    }

    #[test]
    fn test_sqlite_to_yaml_migration() {
        let sqlite_file = NamedTempFile::with_suffix(".db").unwrap();
        let temp_dir = TempDir::new().unwrap();
        let yaml_path = temp_dir.path().join("inventory.yaml");

        SqliteBackend::new(sqlite_file.path())
            .unwrap()
            .save(&sample_inventory())
            .unwrap();

        let sqlite = SqliteBackend::new(sqlite_file.path()).unwrap();
        let count = migrate(&sqlite, &YamlBackend::new(&yaml_path)).unwrap();
        assert_eq!(count, 2);

        let loaded = YamlBackend::new(&yaml_path).load().unwrap();
        assert_eq!(loaded.records(), sample_inventory().records());
    }

    #[test]
    fn test_json_export_import() {
        let temp_dir = TempDir::new().unwrap();
        let json_path = temp_dir.path().join("export.json");

        let source = MemoryBackend::with_inventory(sample_inventory());
        assert_eq!(export_backend_to_json(&source, &json_path).unwrap(), 2);

        let destination = MemoryBackend::new();
        assert_eq!(import_json_to_backend(&json_path, &destination).unwrap(), 2);
        assert_eq!(destination.load().unwrap(), source.load().unwrap());
    }

    #[test]
    fn test_import_rejects_duplicate_part_ids() {
        let temp_dir = TempDir::new().unwrap();
        let json_path = temp_dir.path().join("dupes.json");

        let mut inventory = sample_inventory();
        inventory.insert(SparePart::new("P1", "Brake Pad", "Jazz", 45.0, 1));
        export_to_json(&inventory, &json_path).unwrap();

        assert!(import_from_json(&json_path).is_err());
    }
}
