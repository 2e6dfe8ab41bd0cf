//! Whole-file JSON reads and writes.

use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;
use tokio::fs;

use crate::{Result, StoreError};

/// Body written for a freshly created collection file.
pub(crate) const EMPTY_COLLECTION: &str = "[]";

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> StoreError {
    StoreError::Json {
        path: path.to_path_buf(),
        source,
    }
}

/// Probe for `path`. Only "not found" counts as absent; other failures propagate.
pub(crate) async fn exists(path: &Path) -> Result<bool> {
    match fs::metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error(path, e)),
    }
}

pub(crate) async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| io_error(path, e))
}

pub(crate) async fn write_text(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body).await.map_err(|e| io_error(path, e))
}

/// Parse a file of any JSON shape.
pub(crate) async fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| io_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| json_error(path, e))
}

/// Parse a collection file. The body must be a JSON array.
pub(crate) async fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| io_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| json_error(path, e))
}

/// Replace a collection file with `records`, two-space indented.
pub(crate) async fn write_records(path: &Path, records: &[Value]) -> Result<()> {
    let body = serde_json::to_string_pretty(records).map_err(|e| json_error(path, e))?;
    write_text(path, &body).await
}

pub(crate) fn to_record<T: serde::Serialize>(path: &Path, record: &T) -> Result<Value> {
    serde_json::to_value(record).map_err(|e| json_error(path, e))
}
