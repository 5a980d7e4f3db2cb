use anyhow::{Context, Result};
use fs2::FileExt;
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::models::Inventory;

/// How long to wait for another process to release the lock file
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Reads and writes the inventory YAML file, guarded by an advisory lock file
pub struct Storage {
    file_path: PathBuf,
    lock_file_path: PathBuf,
}

impl Storage {
    /// Creates a new Storage instance
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let mut lock_name = file_path.as_os_str().to_os_string();
        lock_name.push(".lock");
        Self {
            file_path,
            lock_file_path: PathBuf::from(lock_name),
        }
    }

    /// Returns the path to the storage file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Acquire an exclusive lock for writing.
    /// The returned handle must be held for the whole operation.
    fn acquire_write_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.lock_file_path)
            .with_context(|| format!("Failed to create lock file: {:?}", self.lock_file_path))?;

        self.wait_for_lock(&lock_file, <File as FileExt>::try_lock_exclusive)?;
        debug!("Acquired write lock on {:?}", self.lock_file_path);

        // Lock holder info, for whoever finds the lock file
        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        );

        Ok(lock_file)
    }

    /// Acquire a shared lock for reading, if a lock file exists
    fn acquire_read_lock(&self) -> Result<Option<File>> {
        if !self.lock_file_path.exists() {
            return Ok(None);
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .open(&self.lock_file_path)
            .with_context(|| format!("Failed to open lock file: {:?}", self.lock_file_path))?;

        self.wait_for_lock(&lock_file, <File as FileExt>::try_lock_shared)?;
        Ok(Some(lock_file))
    }

    fn wait_for_lock(&self, lock_file: &File, try_lock: fn(&File) -> std::io::Result<()>) -> Result<()> {
        let start = Instant::now();

        loop {
            match try_lock(lock_file) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > LOCK_TIMEOUT {
                        anyhow::bail!(
                            "Timeout waiting for file lock - another process may be editing: {:?}",
                            self.file_path
                        );
                    }
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to acquire lock on {:?}", self.lock_file_path)
                    })
                }
            }
        }
    }

    /// Reads and parses the file without taking a lock.
    /// A missing or empty file is an empty inventory.
    fn read_unlocked(&self) -> Result<Inventory> {
        if !self.file_path.exists() {
            return Ok(Inventory::new());
        }

        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to open file: {:?}", self.file_path))?;
        if content.trim().is_empty() {
            return Ok(Inventory::new());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", self.file_path))
    }

    fn write_unlocked(&self, inventory: &Inventory) -> Result<()> {
        let yaml = serde_yaml::to_string(inventory)?;
        fs::write(&self.file_path, yaml)
            .with_context(|| format!("Failed to write file: {:?}", self.file_path))?;
        debug!(
            "Wrote {} part(s) to {:?}",
            inventory.parts.len(),
            self.file_path
        );
        Ok(())
    }

    /// Loads the inventory from the YAML file, creating an empty one if missing
    pub fn load(&self) -> Result<Inventory> {
        if !self.file_path.exists() {
            let default_inventory = Inventory::new();
            self.save(&default_inventory)?;
            return Ok(default_inventory);
        }

        let lock = self.acquire_read_lock()?;
        let inventory = self.read_unlocked()?;
        drop(lock);

        inventory.validate_unique_part_ids()?;
        Ok(inventory)
    }

    /// Saves the inventory to the YAML file
    pub fn save(&self, inventory: &Inventory) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Released when dropped
        let _lock = self.acquire_write_lock()?;
        self.write_unlocked(inventory)
    }

    /// Reloads the file, applies `update_fn` and saves, all under one write lock.
    /// The file is left untouched when `update_fn` changes nothing.
    pub fn update_atomically<F, T>(&self, update_fn: F) -> Result<T>
    where
        F: FnOnce(&mut Inventory) -> T,
    {
        let _lock = self.acquire_write_lock()?;

        let mut inventory = self.read_unlocked()?;
        inventory.validate_unique_part_ids()?;

        let before = inventory.clone();
        let result = update_fn(&mut inventory);
        if inventory != before {
            self.write_unlocked(&inventory)?;
        } else {
            debug!("No changes to write to {:?}", self.file_path);
        }

        Ok(result)
    }
}
