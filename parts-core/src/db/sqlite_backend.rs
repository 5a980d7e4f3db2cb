//! SQLite database storage backend
//!
//! This backend stores spare parts in a SQLite database file, one row per
//! part, with `part_id` enforced unique by the schema.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::traits::{BackendType, PartStore};
use crate::models::{Inventory, PartDocument, SparePart};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

const PART_COLUMNS: &str =
    "id, part_id, name, car_model, price, stock, created_at, modified_at";

/// SQLite backend implementation
pub struct SqliteBackend {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Creates a new SQLite backend with write-ahead logging enabled
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, true)
    }

    /// Opens (creating if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P, wal_mode: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open SQLite database: {:?}", path))?;

        if wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        let backend = Self {
            path,
            conn: Mutex::new(conn),
        };

        backend.init_schema()?;
        Ok(backend)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection lock poisoned"))
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        // Missing table reads as version 0
        let current_version: i32 = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if current_version == 0 {
            debug!("Creating inventory schema in {:?}", self.path);
            conn.execute_batch(include_str!("schema.sql"))?;
        } else if current_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is not supported, expected {}",
                current_version,
                SCHEMA_VERSION
            );
        }

        Ok(())
    }

    /// Maps a `spare_parts` row selected with [`PART_COLUMNS`]
    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<PartDocument> {
        let id_str: String = row.get(0)?;
        let created_at_str: String = row.get(6)?;
        let modified_at_str: String = row.get(7)?;

        Ok(PartDocument {
            id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
            part: SparePart {
                part_id: row.get(1)?,
                name: row.get(2)?,
                car_model: row.get(3)?,
                price: row.get(4)?,
                stock: row.get(5)?,
            },
            created_at: parse_timestamp(&created_at_str),
            modified_at: parse_timestamp(&modified_at_str),
        })
    }

    fn load_documents(conn: &Connection) -> Result<Vec<PartDocument>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM spare_parts ORDER BY created_at, rowid",
            PART_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_document)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?);
        }
        Ok(documents)
    }

    fn load_name(conn: &Connection) -> Result<String> {
        let name: Option<String> = conn
            .query_row("SELECT name FROM metadata WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(name.unwrap_or_default())
    }

    /// Save a document to the database
    fn save_document(conn: &Connection, doc: &PartDocument) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO spare_parts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                PART_COLUMNS
            ),
            params![
                doc.id.to_string(),
                doc.part.part_id,
                doc.part.name,
                doc.part.car_model,
                doc.part.price,
                doc.part.stock,
                doc.created_at.to_rfc3339(),
                doc.modified_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl PartStore for SqliteBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Sqlite
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Inventory> {
        let conn = self.conn()?;
        Ok(Inventory {
            name: Self::load_name(&conn)?,
            parts: Self::load_documents(&conn)?,
        })
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM spare_parts", [])?;
        for doc in &inventory.parts {
            Self::save_document(&tx, doc)?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO metadata (id, name) VALUES (1, ?1)",
            [&inventory.name],
        )?;

        tx.commit()?;
        debug!("Saved {} part(s) to {:?}", inventory.parts.len(), self.path);
        Ok(())
    }

    // Single-row overrides

    fn find_all(&self) -> Result<Vec<SparePart>> {
        let conn = self.conn()?;
        Ok(Self::load_documents(&conn)?
            .into_iter()
            .map(|d| d.part)
            .collect())
    }

    fn find_by_key(&self, part_id: &str) -> Result<Option<SparePart>> {
        let conn = self.conn()?;
        let doc = conn
            .query_row(
                &format!("SELECT {} FROM spare_parts WHERE part_id = ?1", PART_COLUMNS),
                [part_id],
                Self::row_to_document,
            )
            .optional()?;
        Ok(doc.map(|d| d.part))
    }

    fn insert(&self, part: &SparePart) -> Result<()> {
        let conn = self.conn()?;
        Self::save_document(&conn, &PartDocument::new(part.clone()))
    }

    fn update_by_key(&self, part_id: &str, fields: &SparePart) -> Result<usize> {
        let conn = self.conn()?;
        // Rows whose values already match are not counted as modified
        let modified = conn.execute(
            "UPDATE spare_parts
             SET part_id = ?2, name = ?3, car_model = ?4, price = ?5, stock = ?6, modified_at = ?7
             WHERE part_id = ?1
               AND NOT (part_id = ?2 AND name = ?3 AND car_model = ?4 AND price = ?5 AND stock = ?6)",
            params![
                part_id,
                fields.part_id,
                fields.name,
                fields.car_model,
                fields.price,
                fields.stock,
                Utc::now().to_rfc3339(),
            ],
        )?;
        debug!("UPDATE {} modified {} row(s)", part_id, modified);
        Ok(modified)
    }

    fn delete_by_key(&self, part_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM spare_parts WHERE part_id = ?1", [part_id])?;
        debug!("DELETE {} removed {} row(s)", part_id, deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sqlite_backend_create_and_load() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let backend = SqliteBackend::new(temp_file.path()).unwrap();

        backend.create_if_not_exists().unwrap();

        let inventory = backend.load().unwrap();
        assert!(inventory.parts.is_empty());
    }

    #[test]
    fn test_sqlite_backend_save_and_load() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let backend = SqliteBackend::new(temp_file.path()).unwrap();

        let mut inventory = Inventory::new();
        inventory.name = "Workshop".to_string();
        inventory.insert(SparePart::new("P1", "Brake Pad", "Civic", 49.99, 10));
        inventory.insert(SparePart::new("P2", "Air Filter", "City", 15.5, 0));

        backend.save(&inventory).unwrap();

        let loaded = backend.load().unwrap();
        assert_eq!(loaded.name, "Workshop");
        assert_eq!(loaded.records(), inventory.records());
        assert_eq!(loaded.parts[0].id, inventory.parts[0].id);
    }

    #[test]
    fn test_sqlite_backend_part_crud() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let backend = SqliteBackend::new(temp_file.path()).unwrap();
        let part = SparePart::new("P1", "Brake Pad", "Civic", 49.99, 10);

        backend.insert(&part).unwrap();
        assert_eq!(backend.find_by_key("P1").unwrap(), Some(part.clone()));
        assert!(backend.find_by_key("P2").unwrap().is_none());

        let mut cheaper = part.clone();
        cheaper.price = 39.99;
        cheaper.stock = 8;
        assert_eq!(backend.update_by_key("P1", &cheaper).unwrap(), 1);
        assert_eq!(backend.update_by_key("P1", &cheaper).unwrap(), 0);
        assert_eq!(backend.update_by_key("P2", &cheaper).unwrap(), 0);
        assert_eq!(backend.find_all().unwrap(), vec![cheaper]);

        assert_eq!(backend.delete_by_key("P1").unwrap(), 1);
        assert_eq!(backend.delete_by_key("P1").unwrap(), 0);
        assert!(backend.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_schema_enforces_unique_part_id() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let backend = SqliteBackend::new(temp_file.path()).unwrap();
        let part = SparePart::new("P1", "Brake Pad", "Civic", 49.99, 10);

        backend.insert(&part).unwrap();
        assert!(backend.insert(&part).is_err());
    }

    #[test]
    fn test_sqlite_reopen_keeps_data() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        {
            let backend = SqliteBackend::new(temp_file.path()).unwrap();
            backend
                .insert(&SparePart::new("P1", "Brake Pad", "Civic", 49.99, 10))
                .unwrap();
        }

        let backend = SqliteBackend::open(temp_file.path(), false).unwrap();
        assert_eq!(backend.find_all().unwrap().len(), 1);
    }
}
