//! # admin-data-store
//!
//! Bootstrap and migration of the admin data directory.
//!
//! ## Layout
//!
//! Relative to the configured data directory:
//! - `admin-users.json` holds canonical admin users
//! - `users.json` is the read-only legacy user file
//! - `logs/admin-activity.json` holds canonical activity logs
//!
//! Every write replaces a whole collection, pretty-printed with two-space
//! indentation. Nothing here locks the files; run one bootstrap at a time.

pub mod bootstrap;
mod collection;
pub mod config;
pub mod layout;

use std::path::PathBuf;

pub use bootstrap::{
    BootstrapReport, Bootstrapper, DefaultAdminOutcome, FilesReport, MigrationOutcome,
};
pub use config::{
    AdminDataConfig, AdminDataLogger, ResolvedConfig, RolePermissions, StaticRolePermissions,
    TracingLogger,
};
pub use layout::DataLayout;

/// Store error types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// True when the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Run the full bootstrap once against the configured directory.
pub async fn run_admin_data_migration(config: &AdminDataConfig) -> Result<BootstrapReport> {
    Bootstrapper::new(config).run().await
}
