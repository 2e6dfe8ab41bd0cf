//! Injected configuration: data directory, role permissions and logger.
//!
//! An [`AdminDataConfig`] holds optional overrides. [`AdminDataConfig::configure`]
//! merges new overrides on top of the current ones and
//! [`AdminDataConfig::reset`] drops them all. [`AdminDataConfig::resolve`]
//! fills the gaps with defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Maps a role name to the permissions it grants.
pub trait RolePermissions: Send + Sync {
    fn permissions_for(&self, role: &str) -> Vec<String>;
}

impl<F> RolePermissions for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn permissions_for(&self, role: &str) -> Vec<String> {
        self(role)
    }
}

/// Sink for the bootstrapper's diagnostics.
pub trait AdminDataLogger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default logger: forwards to `tracing` under the `admin_data` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl AdminDataLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "admin_data", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "admin_data", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "admin_data", "{message}");
    }
}

/// Table-driven role resolver. Unknown roles get `fallback`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRolePermissions {
    #[serde(default)]
    pub permissions: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_fallback_permissions")]
    pub fallback: Vec<String>,
}

fn default_fallback_permissions() -> Vec<String> {
    vec!["read".to_string()]
}

impl Default for StaticRolePermissions {
    fn default() -> Self {
        Self {
            permissions: BTreeMap::new(),
            fallback: default_fallback_permissions(),
        }
    }
}

impl RolePermissions for StaticRolePermissions {
    fn permissions_for(&self, role: &str) -> Vec<String> {
        self.permissions
            .get(role)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Optional overrides for the admin data subsystem.
#[derive(Clone, Default)]
pub struct AdminDataConfig {
    pub data_dir: Option<PathBuf>,
    pub role_permissions: Option<Arc<dyn RolePermissions>>,
    pub logger: Option<Arc<dyn AdminDataLogger>>,
}

impl fmt::Debug for AdminDataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminDataConfig")
            .field("data_dir", &self.data_dir)
            .field(
                "role_permissions",
                &self.role_permissions.as_ref().map(|_| "Arc<dyn RolePermissions>"),
            )
            .field(
                "logger",
                &self.logger.as_ref().map(|_| "Arc<dyn AdminDataLogger>"),
            )
            .finish()
    }
}

impl AdminDataConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    pub fn with_role_permissions(mut self, resolver: impl RolePermissions + 'static) -> Self {
        self.role_permissions = Some(Arc::new(resolver));
        self
    }

    pub fn with_logger(mut self, logger: impl AdminDataLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Merge `overrides` into this config. Unset fields keep their current value.
    pub fn configure(&mut self, overrides: AdminDataConfig) {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = Some(data_dir);
        }
        if let Some(resolver) = overrides.role_permissions {
            self.role_permissions = Some(resolver);
        }
        if let Some(logger) = overrides.logger {
            self.logger = Some(logger);
        }
    }

    /// Drop every override.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Concrete values, with defaults for anything not overridden.
    pub fn resolve(&self) -> ResolvedConfig {
        ResolvedConfig {
            data_dir: self.data_dir.clone().unwrap_or_else(default_data_dir),
            role_permissions: self
                .role_permissions
                .clone()
                .unwrap_or_else(|| Arc::new(StaticRolePermissions::default())),
            logger: self
                .logger
                .clone()
                .unwrap_or_else(|| Arc::new(TracingLogger)),
        }
    }
}

/// Fully resolved configuration.
#[derive(Clone)]
pub struct ResolvedConfig {
    pub data_dir: PathBuf,
    pub role_permissions: Arc<dyn RolePermissions>,
    pub logger: Arc<dyn AdminDataLogger>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("data_dir", &self.data_dir)
            .field("role_permissions", &"Arc<dyn RolePermissions>")
            .field("logger", &"Arc<dyn AdminDataLogger>")
            .finish()
    }
}

/// `<cwd>/content/auth`.
pub fn default_data_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("content")
        .join("auth")
}
