//! Bootstrap configuration and root folder resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`KAKEIBO_ROOT_FOLDER`)
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! A missing TOML file is not an error: a warning is logged and defaults
//! apply. A file that exists but does not parse is a `Config` error.

use crate::store::{Backend, JsonFileStore, MemoryStore, SqliteStore, Store, DATABASE_FILE};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Environment variable naming the data root folder
pub const ROOT_FOLDER_ENV: &str = "KAKEIBO_ROOT_FOLDER";

/// Default HTTP port for kakeibo-web
pub const DEFAULT_PORT: u16 = 5730;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database / JSON files
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Overrides the built-in usage memo
    #[serde(default)]
    pub memo: Option<String>,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            bind_address: default_bind_address(),
            memo: None,
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: Backend,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); each binary has its own default
    #[serde(default)]
    pub level: Option<String>,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Configured level, or `default` when the file sets none
    pub fn level_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.level.as_deref().unwrap_or(default)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load from an explicit path, or from the platform config location.
    ///
    /// An explicit path that does not exist is an error; a missing
    /// platform file just yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    warn!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// `<config_dir>/kakeibo/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kakeibo").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("kakeibo"))
        .unwrap_or_else(|| PathBuf::from("./kakeibo_data"))
}

/// Root folder resolution: CLI > environment > TOML > OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Build the configured store rooted at `root_folder`
pub async fn open_store(backend: Backend, root_folder: &Path) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match backend {
        Backend::Sqlite => Arc::new(SqliteStore::open(&root_folder.join(DATABASE_FILE)).await?),
        Backend::Json => Arc::new(JsonFileStore::open(root_folder).await?),
        Backend::Memory => Arc::new(MemoryStore::new()),
    };
    info!("Using {} store in {}", store.backend_name(), root_folder.display());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.storage.backend, Backend::Sqlite);
        assert_eq!(config.logging.level, None);
        assert_eq!(config.logging.level_or("warn"), "warn");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfig::from_toml_str(
            r#"
            root_folder = "/tmp/kakeibo"
            port = 8080
            memo = "1 cup = 240 ml"

            [storage]
            backend = "json"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_folder, Some(PathBuf::from("/tmp/kakeibo")));
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage.backend, Backend::Json);
        assert_eq!(config.logging.level_or("warn"), "debug");
        assert_eq!(config.memo.as_deref(), Some("1 cup = 240 ml"));
    }

    #[test]
    fn test_parse_rejects_unknown_backend() {
        let err = TomlConfig::from_toml_str("[storage]\nbackend = \"oracle\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_cli_arg_wins() {
        let config = TomlConfig {
            root_folder: Some(PathBuf::from("/from/toml")),
            ..TomlConfig::default()
        };
        let resolved = resolve_root_folder(Some(Path::new("/from/cli")), &config);
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }
}
