use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::{backend_type_from_extension, infer_backend_type, BackendType, DatabaseConfig};

/// Environment variable naming the inventory database file
pub const DB_ENV_VAR: &str = "PARTS_DB";
/// Inventory file picked up from the current directory
pub const LOCAL_DB_FILE: &str = "inventory.yaml";

const APP_DIR: &str = "car-parts";
const SETTINGS_FILE: &str = "config.yaml";

/// User settings, read from `<config_dir>/car-parts/config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Inventory database to use when nothing else names one
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Backend to use instead of inferring it from the file extension
    #[serde(default)]
    pub backend: Option<BackendType>,
    /// Enable SQLite write-ahead logging
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

fn default_wal_mode() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            backend: None,
            wal_mode: default_wal_mode(),
        }
    }
}

impl Settings {
    /// Loads settings from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path.as_ref()))
    }

    /// Loads the user's settings file, or defaults if there is none
    pub fn load_default() -> Result<Self> {
        match get_settings_path() {
            Ok(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Saves settings to the provided path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&path, yaml)
            .with_context(|| format!("Failed to write settings file: {:?}", path.as_ref()))
    }
}

/// Gets the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Failed to determine config directory")?;
    Ok(dir.join(APP_DIR))
}

/// Gets the path to the settings file
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(SETTINGS_FILE))
}

/// Gets the default inventory location in the user's data directory
pub fn get_default_db_path() -> Result<PathBuf> {
    let dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(dir.join(APP_DIR).join(LOCAL_DB_FILE))
}

/// Builds the database configuration from command-line choices and settings.
///
/// The file is chosen by priority: the explicit path, then `PARTS_DB`, then
/// `inventory.yaml` in the current directory, then the settings file, then
/// the per-user data directory. The backend is the explicit choice, then the
/// settings file, then the file extension. A path named by the flag or the
/// environment variable is opened by its extension when it has a known one.
pub fn resolve_database_config(
    cli_path: Option<&Path>,
    cli_backend: Option<BackendType>,
) -> Result<DatabaseConfig> {
    let settings = Settings::load_default()?;
    let (path, named) = resolve_path(
        cli_path,
        env::var_os(DB_ENV_VAR).map(PathBuf::from),
        Path::new(LOCAL_DB_FILE),
        &settings,
        get_default_db_path,
    )?;
    Ok(build_config(path, named, cli_backend, &settings))
}

/// Picks the inventory file. The flag is true when the user named the file
/// directly (flag or environment variable).

fn resolve_path(
    cli_path: Option<&Path>,
    env_path: Option<PathBuf>,
    local_file: &Path,
    settings: &Settings,
    default_path: impl FnOnce() -> Result<PathBuf>,
) -> Result<(PathBuf, bool)> {
    // Priority 1: explicit path
    if let Some(path) = cli_path {
        return Ok((path.to_path_buf(), true));
    }

    // Priority 2: environment variable
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        debug!("Using inventory from {}: {:?}", DB_ENV_VAR, path);
        return Ok((path, true));
    }

    // Priority 3: inventory file in the current directory
    if local_file.exists() {
        return Ok((local_file.to_path_buf(), false));
    }

    // Priority 4: settings file
    if let Some(path) = &settings.database {
        return Ok((path.clone(), false));
    }

    // Priority 5: per-user data directory
    Ok((default_path()?, false))
}

fn build_config(
    path: PathBuf,
    named: bool,
    cli_backend: Option<BackendType>,
    settings: &Settings,
) -> DatabaseConfig {
    let from_extension = if named {
        backend_type_from_extension(&path)
    } else {
        None
    };
    let backend_type = cli_backend
        .or(from_extension)
        .or(settings.backend)
        .unwrap_or_else(|| infer_backend_type(&path));
    DatabaseConfig {
        path,
        backend_type,
        wal_mode: settings.wal_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_default() -> Result<PathBuf> {
        anyhow::bail!("default path should not be needed")
    }

    #[test]
    fn test_cli_path_wins() {
        let settings = Settings {
            database: Some(PathBuf::from("settings.yaml")),
            ..Settings::default()
        };
        let path = resolve_path(
            Some(Path::new("cli.db")),
            Some(PathBuf::from("env.yaml")),
            Path::new(LOCAL_DB_FILE),
            &settings,
            no_default,
        )
        .unwrap();
        assert_eq!(path, (PathBuf::from("cli.db"), true));
    }

    #[test]
    fn test_env_path_before_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(LOCAL_DB_FILE);
        fs::write(&local, "").unwrap();

        let path = resolve_path(
            None,
            Some(PathBuf::from("env.yaml")),
            &local,
            &Settings::default(),
            no_default,
        )
        .unwrap();
        assert_eq!(path, (PathBuf::from("env.yaml"), true));

        // Empty variable is ignored
        let path = resolve_path(
            None,
            Some(PathBuf::new()),
            &local,
            &Settings::default(),
            no_default,
        )
        .unwrap();
        assert_eq!(path, (local, false));
    }

    #[test]
    fn test_settings_then_default() {
        let temp_dir = TempDir::new().unwrap();
        let missing_local = temp_dir.path().join(LOCAL_DB_FILE);
        let settings = Settings {
            database: Some(PathBuf::from("/srv/parts.db")),
            ..Settings::default()
        };

        let path = resolve_path(None, None, &missing_local, &settings, no_default).unwrap();
        assert_eq!(path, (PathBuf::from("/srv/parts.db"), false));

        let path = resolve_path(None, None, &missing_local, &Settings::default(), || {
            Ok(PathBuf::from("default.yaml"))
        })
        .unwrap();
        assert_eq!(path, (PathBuf::from("default.yaml"), false));
    }

    #[test]
    fn test_build_config_backend_priority() {
        let settings = Settings {
            backend: Some(BackendType::Yaml),
            wal_mode: false,
            ..Settings::default()
        };

        let config = build_config(PathBuf::from("parts.db"), false, None, &Settings::default());
        assert_eq!(config.backend_type, BackendType::Sqlite);

        let config = build_config(PathBuf::from("parts.db"), false, None, &settings);
        assert_eq!(config.backend_type, BackendType::Yaml);
        assert!(!config.wal_mode);

        let config = build_config(
            PathBuf::from("parts.db"),
            false,
            Some(BackendType::Sqlite),
            &settings,
        );
        assert_eq!(config.backend_type, BackendType::Sqlite);
    }

    #[test]
    fn test_named_path_extension_beats_settings_backend() {
        let settings = Settings {
            backend: Some(BackendType::Yaml),
            ..Settings::default()
        };

        let config = build_config(PathBuf::from("shop.db"), true, None, &settings);
        assert_eq!(config.backend_type, BackendType::Sqlite);

        // No known extension: settings still decide
        let config = build_config(PathBuf::from("shop"), true, None, &Settings {
            backend: Some(BackendType::Sqlite),
            ..Settings::default()
        });
        assert_eq!(config.backend_type, BackendType::Sqlite);

        // The backend flag beats the extension
        let config = build_config(PathBuf::from("shop.db"), true, Some(BackendType::Yaml), &settings);
        assert_eq!(config.backend_type, BackendType::Yaml);
    }

    #[test]
    fn test_settings_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("car-parts").join(SETTINGS_FILE);

        let settings = Settings {
            database: Some(PathBuf::from("/srv/parts.db")),
            backend: Some(BackendType::Sqlite),
            wal_mode: true,
        };
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_settings_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);
        fs::write(&path, "backend: sqlite\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.backend, Some(BackendType::Sqlite));
        assert_eq!(settings.database, None);
        assert!(settings.wal_mode);
    }
}
