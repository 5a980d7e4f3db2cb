//! Create/read/update/delete orchestration for spare parts
//!
//! [`PartController`] owns a store handle, validates form payloads, enforces
//! part ID rules and turns store results into typed outcomes. Anything the
//! caller holds (a listing, a form draft) is stale after a mutating call and
//! should be re-read with [`PartController::list`].

use log::{info, warn};
use std::path::Path;

use crate::db::{self, BackendType, PartStore};
use crate::display::DisplayRow;
use crate::error::InventoryError;
use crate::models::{PartForm, SparePart};
use crate::validator::validate;

/// Result of an update that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The stored part now holds these values
    Updated(SparePart),
    /// Nothing was modified: the part ID is unknown or the values were unchanged
    NoChanges,
}

/// Result of a delete that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// No part with that ID was stored
    NotFound,
}

/// Runs inventory operations against one store
pub struct PartController {
    store: Box<dyn PartStore>,
}

impl PartController {
    pub fn new(store: Box<dyn PartStore>) -> Self {
        Self { store }
    }

    /// Opens the store at `path` and wraps it in a controller
    pub fn open(path: &Path, backend_type: Option<BackendType>) -> Result<Self, InventoryError> {
        Ok(Self::new(db::create_backend(path, backend_type)?))
    }

    /// The underlying store
    pub fn store(&self) -> &dyn PartStore {
        self.store.as_ref()
    }

    /// Validates `form` and stores it as a new part.
    ///
    /// Fails with [`InventoryError::DuplicateKey`] without writing if the
    /// part ID is already taken.
    pub fn create(&self, form: &PartForm) -> Result<SparePart, InventoryError> {
        let part = validate(form)?;

        if self.store.find_by_key(&part.part_id)?.is_some() {
            warn!("Rejected duplicate part ID {}", part.part_id);
            return Err(InventoryError::DuplicateKey(part.part_id));
        }

        self.store.insert(&part)?;
        info!("Created part {}", part.part_id);
        Ok(part)
    }

    /// Every stored part, in store order (not guaranteed to be insertion order)
    pub fn list(&self) -> Result<Vec<SparePart>, InventoryError> {
        Ok(self.store.find_all()?)
    }

    /// Listing lines, each paired with the part ID it shows
    pub fn display_rows(&self) -> Result<Vec<DisplayRow>, InventoryError> {
        Ok(self.list()?.iter().map(DisplayRow::from).collect())
    }

    /// Looks a part up by ID
    pub fn get(&self, key: &str) -> Result<Option<SparePart>, InventoryError> {
        let key = require_key(key)?;
        Ok(self.store.find_by_key(key)?)
    }

    /// Editable form text for the part stored under `key`, read fresh from the store
    pub fn edit_form(&self, key: &str) -> Result<Option<PartForm>, InventoryError> {
        Ok(self.get(key)?.as_ref().map(PartForm::from))
    }

    /// Overwrites the part stored under `key` with the validated `form`.
    ///
    /// The form's part ID must equal `key` when `key` is stored: renaming a
    /// part is a delete followed by a create. An unknown key and an
    /// unchanged part both report [`UpdateOutcome::NoChanges`].
    pub fn update(&self, key: &str, form: &PartForm) -> Result<UpdateOutcome, InventoryError> {
        let key = require_key(key)?;
        let part = validate(form)?;

        if part.part_id != key {
            // An unknown key reports no changes whatever the form holds
            if self.store.find_by_key(key)?.is_none() {
                warn!("No changes made or part {} not found", key);
                return Ok(UpdateOutcome::NoChanges);
            }
            return Err(InventoryError::PartIdChange {
                key: key.to_string(),
                part_id: part.part_id,
            });
        }

        let modified = self.store.update_by_key(key, &part)?;
        if modified == 0 {
            warn!("No changes made or part {} not found", key);
            return Ok(UpdateOutcome::NoChanges);
        }

        info!("Updated part {}", key);
        Ok(UpdateOutcome::Updated(part))
    }

    /// Deletes the part stored under `key`
    pub fn delete(&self, key: &str) -> Result<DeleteOutcome, InventoryError> {
        let key = require_key(key)?;

        if self.store.delete_by_key(key)? == 0 {
            warn!("Part {} not found for deletion", key);
            return Ok(DeleteOutcome::NotFound);
        }

        info!("Deleted part {}", key);
        Ok(DeleteOutcome::Deleted)
    }
}

fn require_key(key: &str) -> Result<&str, InventoryError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(InventoryError::MissingKey);
    }
    Ok(key)
}
