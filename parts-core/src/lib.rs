pub mod config;
pub mod controller;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod storage;
pub mod validator;

// Re-export commonly used types
pub use config::{resolve_database_config, Settings, DB_ENV_VAR, LOCAL_DB_FILE};
pub use controller::{DeleteOutcome, PartController, UpdateOutcome};
pub use db::{BackendType, DatabaseConfig, InventoryStats, PartStore};
pub use display::{format_price, from_display_line, to_display_line, DisplayRow};
pub use error::{InventoryError, ValidationError};
pub use models::{Field, Inventory, PartDocument, PartForm, SparePart};
pub use storage::Storage;
pub use validator::validate;
