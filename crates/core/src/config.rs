//! Application configuration
//!
//! Loaded from `config.toml` in the platform config directory, or from the
//! path in `BANQUET_CONFIG`. A missing file means defaults throughout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AdminGate, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
use crate::search::SUGGESTION_DEBOUNCE;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "BANQUET_CONFIG";

const CONFIG_FILE: &str = "config.toml";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Could not determine {0} directory")]
    NoProjectDirs(&'static str),
    #[error("Invalid admin credentials: {0}")]
    Admin(String),
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        crate::error::Error::Config(e.to_string())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub search: SearchConfig,
    pub sync: SyncConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the database; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "banquet.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    /// Plain password; ignored when `password_hash` is set
    pub password: Option<String>,
    /// Argon2 PHC string
    pub password_hash: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: None,
            password_hash: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: SUGGESTION_DEBOUNCE.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How often to look for writes from other processes
    pub poll_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where CSV exports go; current directory when unset
    pub dir: Option<PathBuf>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "xuanlong", "banquet")
}

impl AppConfig {
    /// Load from `BANQUET_CONFIG` or the default location
    pub fn load() -> Result<Self, ConfigError> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        Self::load_from(&path)
    }

    /// Load from a file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Full path of the database file
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        let dir = match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()
                .ok_or(ConfigError::NoProjectDirs("data"))?
                .data_dir()
                .to_path_buf(),
        };
        Ok(dir.join(&self.storage.database_file))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync.poll_interval_ms.max(1))
    }

    /// Build the admin gate from the configured credentials
    pub fn admin_gate(&self) -> Result<AdminGate, ConfigError> {
        let admin = &self.admin;
        let gate = match (&admin.password_hash, &admin.password) {
            (Some(hash), _) => AdminGate::from_hash(&admin.username, hash.clone()),
            (None, Some(password)) => AdminGate::new(&admin.username, password),
            (None, None) => AdminGate::new(&admin.username, DEFAULT_ADMIN_PASSWORD),
        };
        gate.map_err(|e| ConfigError::Admin(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.storage.database_file, "banquet.db");
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[storage]
data_dir = "/var/lib/banquet"

[search]
debounce_ms = 150
"#;
        let config = AppConfig::from_toml(toml).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(150));
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/var/lib/banquet/banquet.db")
        );
        assert_eq!(config.sync.poll_interval_ms, 500);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.search.debounce_ms, 300);
    }

    #[test]
    fn test_bad_toml_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ndebounce_ms = \"soon\"\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_admin_gate_from_config() {
        let config = AppConfig::from_toml("[admin]\nusername = \"host\"\npassword = \"gala2024\"\n").unwrap();
        let gate = config.admin_gate().unwrap();
        assert!(gate.verify("host", "gala2024"));
        assert!(!gate.verify("admin", "password"));
    }
}
