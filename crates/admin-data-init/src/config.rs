//! Settings file for the init binary.

use std::path::{Path, PathBuf};

use admin_data_store::{AdminDataConfig, StaticRolePermissions};
use serde::{Deserialize, Serialize};

/// Env var naming the settings file.
pub const CONFIG_ENV: &str = "ADMIN_DATA_CONFIG";
/// Env var overriding the data directory when the settings leave it empty.
pub const DATA_DIR_ENV: &str = "ADMIN_DATA_DIR";
/// Settings file looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "admin-data.toml";

/// Complete init settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitSettings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Role → permission table handed to the bootstrapper.
    #[serde(default)]
    pub roles: StaticRolePermissions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Data directory. Empty = `ADMIN_DATA_DIR`, then `<cwd>/content/auth`.
    #[serde(default)]
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl InitSettings {
    /// Load settings from the configured location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path(std::env::var(CONFIG_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn config_path(env_override: Option<String>) -> PathBuf {
        match env_override {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }

    /// Data directory override, if any. `None` leaves the library default.
    pub fn data_dir(&self, env_override: Option<String>) -> Option<PathBuf> {
        if !self.storage.data_dir.is_empty() {
            return Some(PathBuf::from(&self.storage.data_dir));
        }
        env_override
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
    }

    /// Build the library configuration from these settings.
    pub fn admin_data_config(&self, env_data_dir: Option<String>) -> AdminDataConfig {
        let mut config = AdminDataConfig::new().with_role_permissions(self.roles.clone());
        if let Some(dir) = self.data_dir(env_data_dir) {
            config = config.with_data_dir(dir);
        }
        config
    }
}
