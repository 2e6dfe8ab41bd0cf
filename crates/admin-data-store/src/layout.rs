//! File layout of the admin data directory.

use std::path::{Path, PathBuf};

/// Canonical admin users.
pub const USERS_FILE: &str = "admin-users.json";
/// Legacy user file, read during migration only.
pub const LEGACY_USERS_FILE: &str = "users.json";
pub const LOGS_DIR: &str = "logs";
/// Canonical activity logs, inside [`LOGS_DIR`].
pub const ACTIVITY_FILE: &str = "admin-activity.json";

/// Paths under one data directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn users_file(&self) -> PathBuf {
        self.root.join(USERS_FILE)
    }

    pub fn legacy_users_file(&self) -> PathBuf {
        self.root.join(LEGACY_USERS_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn activity_file(&self) -> PathBuf {
        self.logs_dir().join(ACTIVITY_FILE)
    }
}
