use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::display::format_price;

/// The five user-editable fields of a spare part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PartId,
    Name,
    CarModel,
    Price,
    Stock,
}

impl Field {
    /// All fields in form order
    pub const ALL: [Field; 5] = [
        Field::PartId,
        Field::Name,
        Field::CarModel,
        Field::Price,
        Field::Stock,
    ];

    /// Field name as used in stored documents and raw payloads
    pub fn key(&self) -> &'static str {
        match self {
            Field::PartId => "part_id",
            Field::Name => "name",
            Field::CarModel => "car_model",
            Field::Price => "price",
            Field::Stock => "stock",
        }
    }

    /// Human readable label shown next to form inputs
    pub fn label(&self) -> &'static str {
        match self {
            Field::PartId => "Part ID",
            Field::Name => "Part Name",
            Field::CarModel => "Compatible Car Model",
            Field::Price => "Price",
            Field::Stock => "Stock Quantity",
        }
    }

    /// Looks a field up by its document key
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One spare part in the inventory, keyed by `part_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePart {
    /// Business key, unique across the inventory
    pub part_id: String,
    pub name: String,
    /// Compatible vehicle model
    pub car_model: String,
    pub price: f64,
    pub stock: u32,
}

impl SparePart {
    pub fn new(
        part_id: impl Into<String>,
        name: impl Into<String>,
        car_model: impl Into<String>,
        price: f64,
        stock: u32,
    ) -> Self {
        Self {
            part_id: part_id.into(),
            name: name.into(),
            car_model: car_model.into(),
            price,
            stock,
        }
    }

    /// Value of the units currently in stock
    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.stock)
    }
}

/// Raw form payload: field text exactly as the user typed it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartForm {
    pub part_id: String,
    pub name: String,
    pub car_model: String,
    pub price: String,
    pub stock: String,
}

impl PartForm {
    pub fn new(
        part_id: impl Into<String>,
        name: impl Into<String>,
        car_model: impl Into<String>,
        price: impl Into<String>,
        stock: impl Into<String>,
    ) -> Self {
        Self {
            part_id: part_id.into(),
            name: name.into(),
            car_model: car_model.into(),
            price: price.into(),
            stock: stock.into(),
        }
    }

    /// Builds a form from a mapping of field name to text.
    /// Unknown names are ignored; absent fields stay empty.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = PartForm::default();
        for (key, value) in pairs {
            if let Some(field) = Field::from_key(key.as_ref()) {
                form.set(field, value);
            }
        }
        form
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::PartId => &self.part_id,
            Field::Name => &self.name,
            Field::CarModel => &self.car_model,
            Field::Price => &self.price,
            Field::Stock => &self.stock,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::PartId => self.part_id = value,
            Field::Name => self.name = value,
            Field::CarModel => self.car_model = value,
            Field::Price => self.price = value,
            Field::Stock => self.stock = value,
        }
    }

    /// Returns true if every field is empty or whitespace
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).trim().is_empty())
    }
}

impl From<&SparePart> for PartForm {
    fn from(part: &SparePart) -> Self {
        Self {
            part_id: part.part_id.clone(),
            name: part.name.clone(),
            car_model: part.car_model.clone(),
            price: format_price(part.price),
            stock: part.stock.to_string(),
        }
    }
}

/// A spare part as persisted by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDocument {
    /// Storage-internal identifier, never shown to the user
    pub id: Uuid,
    #[serde(flatten)]
    pub part: SparePart,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl PartDocument {
    pub fn new(part: SparePart) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            part,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn part_id(&self) -> &str {
        &self.part.part_id
    }
}

/// The whole spare part collection as held by file-backed stores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Display name of the inventory
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parts: Vec<PartDocument>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the document with the given business key
    pub fn find(&self, part_id: &str) -> Option<&PartDocument> {
        self.parts.iter().find(|d| d.part_id() == part_id)
    }

    /// Appends a new document. Uniqueness is the caller's concern.
    pub fn insert(&mut self, part: SparePart) -> &PartDocument {
        self.parts.push(PartDocument::new(part));
        let last = self.parts.len() - 1;
        &self.parts[last]
    }

    /// Overwrites the fields of the document keyed by `part_id`.
    ///
    /// Returns the number of documents modified: 0 if the key is absent
    /// or the stored values already equal `fields`.
    pub fn update(&mut self, part_id: &str, fields: &SparePart) -> usize {
        match self.parts.iter_mut().find(|d| d.part.part_id == part_id) {
            Some(doc) if doc.part != *fields => {
                doc.part = fields.clone();
                doc.modified_at = Utc::now();
                1
            }
            _ => 0,
        }
    }

    /// Removes the first document keyed by `part_id`, returning the number removed
    pub fn delete(&mut self, part_id: &str) -> usize {
        match self.parts.iter().position(|d| d.part_id() == part_id) {
            Some(pos) => {
                self.parts.remove(pos);
                1
            }
            None => 0,
        }
    }

    /// Records in storage order
    pub fn records(&self) -> Vec<SparePart> {
        self.parts.iter().map(|d| d.part.clone()).collect()
    }

    /// Total units across all parts
    pub fn total_units(&self) -> u64 {
        self.parts.iter().map(|d| u64::from(d.part.stock)).sum()
    }

    /// Total value of stock across all parts
    pub fn stock_value(&self) -> f64 {
        self.parts.iter().map(|d| d.part.stock_value()).sum()
    }

    /// Fails if two documents share a part ID (e.g. after a hand edit of the file)
    pub fn validate_unique_part_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for doc in &self.parts {
            if !seen.insert(doc.part_id()) {
                anyhow::bail!("Duplicate part ID in inventory: {}", doc.part_id());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brake_pad() -> SparePart {
        SparePart::new("P1", "Brake Pad", "Civic", 49.99, 10)
    }

    #[test]
    fn test_form_from_pairs() {
        let form = PartForm::from_pairs([
            ("part_id", "P1"),
            ("name", "Brake Pad"),
            ("car_model", "Civic"),
            ("price", "49.99"),
            ("colour", "red"),
        ]);

        assert_eq!(form.part_id, "P1");
        assert_eq!(form.price, "49.99");
        assert_eq!(form.stock, "");
    }

    #[test]
    fn test_form_from_part_keeps_decimal_point() {
        let part = SparePart::new("P2", "Oil Filter", "Corolla", 50.0, 3);
        let form = PartForm::from(&part);
        assert_eq!(form.price, "50.0");
        assert_eq!(form.stock, "3");
    }

    #[test]
    fn test_form_is_blank() {
        assert!(!PartForm::from(&brake_pad()).is_blank());
        assert!(PartForm::default().is_blank());

        let mut form = PartForm::default();
        form.set(Field::Name, "   ");
        assert!(form.is_blank());
    }

    #[test]
    fn test_inventory_update_counts_modifications() {
        let mut inventory = Inventory::new();
        inventory.insert(brake_pad());
        let before = inventory.parts[0].modified_at;

        // Identical values do not count as a modification
        assert_eq!(inventory.update("P1", &brake_pad()), 0);
        assert_eq!(inventory.parts[0].modified_at, before);

        let mut cheaper = brake_pad();
        cheaper.price = 39.99;
        assert_eq!(inventory.update("P1", &cheaper), 1);
        assert_eq!(inventory.parts[0].part.price, 39.99);
        assert!(inventory.parts[0].modified_at >= before);

        assert_eq!(inventory.update("P9", &cheaper), 0);
    }

    #[test]
    fn test_inventory_delete() {
        let mut inventory = Inventory::new();
        inventory.insert(brake_pad());

        assert_eq!(inventory.delete("P9"), 0);
        assert_eq!(inventory.delete("P1"), 1);
        assert!(inventory.parts.is_empty());
        assert_eq!(inventory.delete("P1"), 0);
    }

    #[test]
    fn test_inventory_totals() {
        let mut inventory = Inventory::new();
        inventory.insert(SparePart::new("P1", "Brake Pad", "Civic", 10.0, 4));
        inventory.insert(SparePart::new("P2", "Wiper", "Swift", 2.5, 2));

        assert_eq!(inventory.total_units(), 6);
        assert_eq!(inventory.stock_value(), 45.0);
    }

    #[test]
    fn test_validate_unique_part_ids() {
        let mut inventory = Inventory::new();
        inventory.insert(brake_pad());
        assert!(inventory.validate_unique_part_ids().is_ok());

        inventory.insert(brake_pad());
        assert!(inventory.validate_unique_part_ids().is_err());
    }
}
