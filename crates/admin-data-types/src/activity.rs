//! Admin activity (audit) log records.

use serde::Serialize;
use serde_json::Value;

use crate::fields::{collection_items, RawRecord};

/// Keys that only appear in legacy (snake_case) log records.
const LEGACY_LOG_KEYS: [&str; 6] = [
    "admin_user_id",
    "resource_type",
    "resource_id",
    "ip_address",
    "user_agent",
    "created_at",
];

/// One audit entry in canonical (camelCase) shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActivityLog {
    /// Opaque identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Id of the acting admin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_user_id: Option<String>,
    /// Username of the acting admin at the time of the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_username: Option<String>,
    /// Free-form action name, e.g. `"login"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Kind of resource acted on, e.g. `page`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Id of the resource, null when the action has none.
    pub resource_id: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Arbitrary structured payload.
    pub details: Option<Value>,
    /// RFC 3339 time of the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The same entry spelled with legacy (snake_case) keys.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegacyActivityLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Reshape a raw log record of either convention into canonical form.
///
/// `null` passes through as `None`.
pub fn normalize_log(raw: &Value) -> Option<AdminActivityLog> {
    if raw.is_null() {
        return None;
    }
    let r = RawRecord::new(raw);

    Some(AdminActivityLog {
        id: r.string(&["id"]),
        admin_user_id: r.string(&["adminUserId", "admin_user_id"]),
        admin_username: r.string(&["adminUsername", "admin_username"]),
        action: r.string(&["action"]),
        resource_type: r.string(&["resourceType", "resource_type"]),
        resource_id: r.string(&["resourceId", "resource_id"]),
        ip_address: r.string(&["ipAddress", "ip_address"]),
        user_agent: r.string(&["userAgent", "user_agent"]),
        details: r.any(&["details"]),
        created_at: r.string(&["createdAt", "created_at"]),
    })
}

/// Rename a canonical entry back to legacy spellings.
pub fn denormalize_log(log: &AdminActivityLog) -> LegacyActivityLog {
    let log = log.clone();
    LegacyActivityLog {
        id: log.id,
        admin_user_id: log.admin_user_id,
        admin_username: log.admin_username,
        action: log.action,
        resource_type: log.resource_type,
        resource_id: log.resource_id,
        ip_address: log.ip_address,
        user_agent: log.user_agent,
        details: log.details,
        created_at: log.created_at,
    }
}

/// Normalize every entry, keeping order and length.
pub fn normalize_log_list(raw: &[Value]) -> Vec<Option<AdminActivityLog>> {
    raw.iter().map(normalize_log).collect()
}

/// True if the entry carries at least one legacy-only key.
pub fn looks_legacy_log(raw: &Value) -> bool {
    RawRecord::new(raw).has_any(&LEGACY_LOG_KEYS)
}

/// Normalize the entries held by a file body (bare array or `{ "logs": [...] }`).
pub fn unwrap_log_file(data: &Value) -> Vec<Option<AdminActivityLog>> {
    normalize_log_list(collection_items(data, "logs"))
}
