//! Idempotent bootstrap of the admin data directory.
//!
//! Three steps, always run in this order by [`Bootstrapper::run`]:
//! 1. ensure the data files exist (fatal on failure)
//! 2. absorb admin-like records from the legacy `users.json` (best effort)
//! 3. ensure at least one active administrator exists (fatal on failure)
//!
//! Each step can be re-run safely; a step with nothing to do writes nothing.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use admin_data_types::{collection_items, normalize_user, AdminUser};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::collection::{self, EMPTY_COLLECTION};
use crate::config::{AdminDataConfig, AdminDataLogger, RolePermissions};
use crate::layout::DataLayout;
use crate::Result;

/// Identifier of the synthesized default administrator.
pub const DEFAULT_ADMIN_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_HANDLE: &str = "admin";
pub const DEFAULT_ADMIN_ROLE: &str = "super_admin";
/// bcrypt hash of the placeholder password `password`.
pub const DEFAULT_ADMIN_PASSWORD_HASH: &str =
    "$2a$10$K.0HwpsoPDGaB/atFBmmXOGTw4ceeg33.WrxJgccpkRJLYczBMvIW";

/// Role given to migrated records that carry none.
const MIGRATED_FALLBACK_ROLE: &str = "admin";

/// Files created by [`Bootstrapper::ensure_data_files`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilesReport {
    pub created: Vec<PathBuf>,
}

impl FilesReport {
    pub fn wrote_nothing(&self) -> bool {
        self.created.is_empty()
    }
}

/// Result of the legacy migration step. Failures are reported, never raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// `users.json` does not exist.
    NoLegacyFile,
    /// The legacy file held no eligible records.
    NothingToMigrate,
    /// Number of records appended to the canonical file.
    Migrated(usize),
    /// The step failed and was skipped.
    Failed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultAdminOutcome {
    /// An active administrator already exists.
    AlreadyPresent,
    /// The default administrator was appended.
    Created,
}

/// Outcome of a full bootstrap run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapReport {
    pub files: FilesReport,
    pub migration: MigrationOutcome,
    pub default_admin: DefaultAdminOutcome,
}

/// Runs the bootstrap steps against one data directory.
#[derive(Clone)]
pub struct Bootstrapper {
    layout: DataLayout,
    role_permissions: Arc<dyn RolePermissions>,
    logger: Arc<dyn AdminDataLogger>,
}

impl std::fmt::Debug for Bootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Bootstrapper {
    pub fn new(config: &AdminDataConfig) -> Self {
        let resolved = config.resolve();
        Self {
            layout: DataLayout::new(resolved.data_dir),
            role_permissions: resolved.role_permissions,
            logger: resolved.logger,
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Run all three steps in order.
    ///
    /// Errors from steps 1 and 3 abort the run; step 2 never fails.
    pub async fn run(&self) -> Result<BootstrapReport> {
        let files = self.ensure_data_files().await?;
        let migration = self.migrate_legacy_users().await;
        let default_admin = self.ensure_default_admin().await?;

        Ok(BootstrapReport {
            files,
            migration,
            default_admin,
        })
    }

    /// Create `logs/`, `admin-users.json` and `logs/admin-activity.json` if missing.
    ///
    /// Existing files are left untouched.
    pub async fn ensure_data_files(&self) -> Result<FilesReport> {
        let result = self.create_missing_files().await;
        if let Err(e) = &result {
            self.logger
                .error(&format!("error ensuring admin data files: {e}"));
        }
        result
    }

    async fn create_missing_files(&self) -> Result<FilesReport> {
        collection::create_dir_all(&self.layout.logs_dir()).await?;

        let mut report = FilesReport::default();
        for path in [self.layout.users_file(), self.layout.activity_file()] {
            if !collection::exists(&path).await? {
                collection::write_text(&path, EMPTY_COLLECTION).await?;
                report.created.push(path);
            }
        }
        Ok(report)
    }

    /// Append admin-like records from the legacy user file.
    ///
    /// A legacy record is migrated when its id is not already present and it
    /// has a non-empty role, a non-empty permission list, or a truthy
    /// `is_admin`. Errors are logged and reported as [`MigrationOutcome::Failed`].
    pub async fn migrate_legacy_users(&self) -> MigrationOutcome {
        match self.absorb_legacy_users().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.logger.error(&format!("error migrating legacy users: {e}"));
                MigrationOutcome::Failed(e.to_string())
            }
        }
    }

    async fn absorb_legacy_users(&self) -> Result<MigrationOutcome> {
        let legacy = match collection::read_json(&self.layout.legacy_users_file()).await {
            Ok(legacy) => legacy,
            Err(e) if e.is_not_found() => return Ok(MigrationOutcome::NoLegacyFile),
            Err(e) => return Err(e),
        };

        let users_path = self.layout.users_file();
        let mut records = collection::read_records(&users_path).await?;
        let mut known_ids: HashSet<String> = records
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_str))
            .map(str::to_owned)
            .collect();

        let now = timestamp_now();
        let mut migrated = Vec::new();
        for candidate in collection_items(&legacy, "users") {
            if !is_migration_candidate(candidate) {
                continue;
            }
            let Some(id) = candidate.get("id").and_then(Value::as_str) else {
                self.logger.warn("skipping legacy admin record without an id");
                continue;
            };
            if !known_ids.insert(id.to_owned()) {
                continue;
            }
            if let Some(user) = self.migrate_user(candidate, &now) {
                migrated.push(user);
            }
        }

        if migrated.is_empty() {
            return Ok(MigrationOutcome::NothingToMigrate);
        }

        for user in &migrated {
            records.push(collection::to_record(&users_path, user)?);
        }
        collection::write_records(&users_path, &records).await?;

        self.logger.info(&format!(
            "migrated {} legacy users to {}",
            migrated.len(),
            crate::layout::USERS_FILE
        ));
        Ok(MigrationOutcome::Migrated(migrated.len()))
    }

    /// Build the canonical record for one eligible legacy user.
    fn migrate_user(&self, legacy: &Value, now: &str) -> Option<AdminUser> {
        let source = legacy.as_object()?;

        let role = text(source, "role").unwrap_or(MIGRATED_FALLBACK_ROLE);
        let permissions = match source.get("permissions") {
            Some(Value::Array(own)) => Value::Array(own.clone()),
            _ => strings(self.role_permissions.permissions_for(role)),
        };
        let handle = text(source, "handle").or_else(|| {
            text(source, "email")
                .and_then(|email| email.split('@').next())
        });

        // Start from the full legacy record so every recognised field reaches
        // the normalizer, then pin the fields migration resolves itself.
        let mut record: Map<String, Value> = source.clone();
        set_text(&mut record, "username", first_text(source, &["username", "email", "handle"]));
        set_text(&mut record, "handle", handle);
        set_text(
            &mut record,
            "passwordHash",
            first_text(source, &["passwordHash", "password_hash", "password"]),
        );
        set_text(
            &mut record,
            "createdAt",
            Some(first_text(source, &["createdAt", "created_at"]).unwrap_or(now)),
        );
        set_text(
            &mut record,
            "updatedAt",
            Some(first_text(source, &["updatedAt", "updated_at"]).unwrap_or(now)),
        );
        record.insert("role".to_string(), Value::String(role.to_string()));
        record.insert("permissions".to_string(), permissions);

        normalize_user(&Value::Object(record))
    }

    /// Append the default administrator unless an active record exists.
    ///
    /// Either `isActive: true` or `is_active: true` counts as active.
    pub async fn ensure_default_admin(&self) -> Result<DefaultAdminOutcome> {
        let result = self.append_default_admin().await;
        if let Err(e) = &result {
            self.logger
                .error(&format!("error ensuring default admin user: {e}"));
        }
        result
    }

    async fn append_default_admin(&self) -> Result<DefaultAdminOutcome> {
        let users_path = self.layout.users_file();
        let mut records = collection::read_records(&users_path).await?;

        if records.iter().any(is_active_record) {
            return Ok(DefaultAdminOutcome::AlreadyPresent);
        }

        let admin = self.default_admin(&timestamp_now());
        records.push(collection::to_record(&users_path, &admin)?);
        collection::write_records(&users_path, &records).await?;

        self.logger.info(&format!(
            "created default admin user ({DEFAULT_ADMIN_EMAIL}); change its password"
        ));
        Ok(DefaultAdminOutcome::Created)
    }

    fn default_admin(&self, now: &str) -> AdminUser {
        AdminUser {
            id: Some(DEFAULT_ADMIN_ID.to_string()),
            username: Some(DEFAULT_ADMIN_USERNAME.to_string()),
            display_name: None,
            handle: Some(DEFAULT_ADMIN_HANDLE.to_string()),
            email: Some(DEFAULT_ADMIN_EMAIL.to_string()),
            password_hash: Some(DEFAULT_ADMIN_PASSWORD_HASH.to_string()),
            totp_secret_id: None,
            totp_enabled: false,
            created_at: Some(now.to_string()),
            updated_at: Some(now.to_string()),
            last_login_at: None,
            is_active: true,
            first_login: false,
            needs_onboarding: false,
            onboarding_step: 0,
            role: Some(DEFAULT_ADMIN_ROLE.to_string()),
            permissions: self.role_permissions.permissions_for(DEFAULT_ADMIN_ROLE),
            certificate_cn: None,
            invited_by: None,
            invitation_token: None,
            invitation_expires: None,
            profile_visibility: None,
            profile_photo: None,
            bio: None,
            pronouns: None,
            social_links: None,
            preferences: None,
            backup_codes: None,
        }
    }
}

/// Current UTC time as RFC 3339 with millisecond precision, `Z` suffix.
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Non-empty string under `key`.
fn text<'a>(source: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    source
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn first_text<'a>(source: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| text(source, key))
}

fn strings(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

fn set_text(record: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        record.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn is_migration_candidate(user: &Value) -> bool {
    let has_role = user
        .get("role")
        .and_then(Value::as_str)
        .is_some_and(|role| !role.is_empty());
    let has_permissions = user
        .get("permissions")
        .and_then(Value::as_array)
        .is_some_and(|permissions| !permissions.is_empty());
    let is_admin = user.get("is_admin").is_some_and(is_truthy);

    has_role || has_permissions || is_admin
}

fn is_active_record(record: &Value) -> bool {
    ["isActive", "is_active"]
        .iter()
        .any(|key| record.get(*key).and_then(Value::as_bool) == Some(true))
}

/// Loose truthiness for legacy markers: `false`, `0`, `""` and `null` are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    #[derive(Default)]
    struct RecordingLogger {
        lines: Mutex<Vec<(&'static str, String)>>,
    }

    impl RecordingLogger {
        fn count(&self, level: &str) -> usize {
            self.lines
                .lock()
                .expect("lock")
                .iter()
                .filter(|(l, _)| *l == level)
                .count()
        }
    }

    impl AdminDataLogger for RecordingLogger {
        fn info(&self, message: &str) {
            self.lines.lock().expect("lock").push(("info", message.to_string()));
        }
        fn warn(&self, message: &str) {
            self.lines.lock().expect("lock").push(("warn", message.to_string()));
        }
        fn error(&self, message: &str) {
            self.lines.lock().expect("lock").push(("error", message.to_string()));
        }
    }

    fn role_permissions(role: &str) -> Vec<String> {
        match role {
            "super_admin" => vec!["all".to_string()],
            "admin" => vec!["read".into(), "write".into(), "manage".into()],
            _ => vec!["read".to_string()],
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        logger: Arc<RecordingLogger>,
        bootstrapper: Bootstrapper,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().expect("tempdir");
            let logger = Arc::new(RecordingLogger::default());
            let config = AdminDataConfig {
                data_dir: Some(dir.path().to_path_buf()),
                role_permissions: Some(Arc::new(role_permissions)),
                logger: Some(logger.clone()),
            };
            let bootstrapper = Bootstrapper::new(&config);
            Self {
                dir,
                logger,
                bootstrapper,
            }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn write(&self, name: &str, body: &str) {
            let path = self.path(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("mkdir");
            }
            std::fs::write(path, body).expect("write fixture");
        }

        fn write_json(&self, name: &str, value: &Value) {
            self.write(name, &value.to_string());
        }

        fn read(&self, name: &str) -> String {
            std::fs::read_to_string(self.path(name)).expect("read fixture")
        }

        fn users(&self) -> Vec<Value> {
            serde_json::from_str(&self.read("admin-users.json")).expect("parse users")
        }
    }

    // -----------------------------------------------------------------
    // ensure_data_files
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_ensure_files_creates_everything() {
        let fx = Fixture::new();
        let report = fx.bootstrapper.ensure_data_files().await.expect("ensure");

        assert!(fx.path("logs").is_dir());
        assert_eq!(fx.read("admin-users.json"), "[]");
        assert_eq!(fx.read("logs/admin-activity.json"), "[]");
        assert_eq!(
            report.created,
            vec![fx.path("admin-users.json"), fx.path("logs/admin-activity.json")]
        );
    }

    #[tokio::test]
    async fn test_ensure_files_keeps_existing_content() {
        let fx = Fixture::new();
        fx.write("admin-users.json", r#"[{"id":"u1"}]"#);

        let report = fx.bootstrapper.ensure_data_files().await.expect("ensure");
        assert_eq!(report.created, vec![fx.path("logs/admin-activity.json")]);
        assert_eq!(fx.read("admin-users.json"), r#"[{"id":"u1"}]"#);
    }

    #[tokio::test]
    async fn test_ensure_files_twice_writes_nothing() {
        let fx = Fixture::new();
        fx.bootstrapper.ensure_data_files().await.expect("first");
        fx.write("logs/admin-activity.json", r#"[{"id":"l1"}]"#);

        let report = fx.bootstrapper.ensure_data_files().await.expect("second");
        assert!(report.wrote_nothing());
        assert_eq!(fx.read("logs/admin-activity.json"), r#"[{"id":"l1"}]"#);
    }

    #[tokio::test]
    async fn test_ensure_files_creates_nested_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("content").join("auth");
        let bootstrapper = Bootstrapper::new(&AdminDataConfig::new().with_data_dir(&root));

        bootstrapper.ensure_data_files().await.expect("ensure");
        assert!(root.join("admin-users.json").is_file());
        assert!(root.join("logs/admin-activity.json").is_file());
    }

    #[tokio::test]
    async fn test_ensure_files_fails_when_logs_is_a_file() {
        let fx = Fixture::new();
        fx.write("logs", "not a directory");

        let err = fx
            .bootstrapper
            .ensure_data_files()
            .await
            .expect_err("logs path is a file");
        assert!(matches!(err, crate::StoreError::Io { .. }));
        assert_eq!(fx.logger.count("error"), 1);
        assert!(!fx.path("admin-users.json").exists());
    }

    // -----------------------------------------------------------------
    // migrate_legacy_users
    // -----------------------------------------------------------------

    async fn migrate(fx: &Fixture, legacy: Value) -> MigrationOutcome {
        fx.write("admin-users.json", "[]");
        fx.write_json("users.json", &legacy);
        fx.bootstrapper.migrate_legacy_users().await
    }

    #[tokio::test]
    async fn test_migrate_without_legacy_file() {
        let fx = Fixture::new();
        fx.write("admin-users.json", "[]");

        let outcome = fx.bootstrapper.migrate_legacy_users().await;
        assert_eq!(outcome, MigrationOutcome::NoLegacyFile);
        assert_eq!(fx.read("admin-users.json"), "[]");
        assert_eq!(fx.logger.count("error"), 0);
    }

    #[tokio::test]
    async fn test_migrate_skips_plain_users() {
        let fx = Fixture::new();
        let outcome = migrate(&fx, json!([{ "id": "u1", "username": "plain" }])).await;

        assert_eq!(outcome, MigrationOutcome::NothingToMigrate);
        assert_eq!(fx.read("admin-users.json"), "[]");
    }

    #[tokio::test]
    async fn test_migrate_user_with_role() {
        let fx = Fixture::new();
        let outcome = migrate(&fx, json!([{ "id": "u1", "username": "a", "role": "admin" }])).await;

        assert_eq!(outcome, MigrationOutcome::Migrated(1));
        let users = fx.users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["id"], "u1");
        assert_eq!(users[0]["permissions"], json!(["read", "write", "manage"]));
        assert_eq!(users[0]["isActive"], true);
        assert_eq!(fx.logger.count("info"), 1);
    }

    #[tokio::test]
    async fn test_migrate_user_with_permissions_keeps_them() {
        let fx = Fixture::new();
        migrate(&fx, json!([{ "id": "u1", "username": "p", "permissions": ["custom"] }])).await;

        let users = fx.users();
        assert_eq!(users[0]["permissions"], json!(["custom"]));
        assert_eq!(users[0]["role"], "admin");
    }

    #[tokio::test]
    async fn test_migrate_is_admin_defaults_role() {
        let fx = Fixture::new();
        let outcome = migrate(&fx, json!([{ "id": "u1", "username": "boss", "is_admin": true }])).await;

        assert_eq!(outcome, MigrationOutcome::Migrated(1));
        let users = fx.users();
        assert_eq!(users[0]["role"], "admin");
        assert_eq!(users[0]["permissions"], json!(["read", "write", "manage"]));
    }

    #[tokio::test]
    async fn test_migrate_ignores_falsy_markers() {
        let fx = Fixture::new();
        let outcome = migrate(
            &fx,
            json!([
                { "id": "u1", "is_admin": false },
                { "id": "u2", "is_admin": 0 },
                { "id": "u3", "role": "" },
                { "id": "u4", "permissions": [] }
            ]),
        )
        .await;
        assert_eq!(outcome, MigrationOutcome::NothingToMigrate);
    }

    #[tokio::test]
    async fn test_migrate_skips_existing_ids() {
        let fx = Fixture::new();
        fx.write_json("admin-users.json", &json!([{ "id": "u1", "role": "admin" }]));
        fx.write_json(
            "users.json",
            &json!([
                { "id": "u1", "role": "admin" },
                { "id": "u2", "role": "admin" }
            ]),
        );

        let outcome = fx.bootstrapper.migrate_legacy_users().await;
        assert_eq!(outcome, MigrationOutcome::Migrated(1));
        let ids: Vec<_> = fx.users().iter().map(|u| u["id"].clone()).collect();
        assert_eq!(ids, vec![json!("u1"), json!("u2")]);
    }

    #[tokio::test]
    async fn test_migrate_when_all_exist_writes_nothing() {
        let fx = Fixture::new();
        let existing = r#"[{"id":"u1","role":"admin"}]"#;
        fx.write("admin-users.json", existing);
        fx.write_json("users.json", &json!([{ "id": "u1", "role": "admin" }]));

        let outcome = fx.bootstrapper.migrate_legacy_users().await;
        assert_eq!(outcome, MigrationOutcome::NothingToMigrate);
        assert_eq!(fx.read("admin-users.json"), existing);
    }

    #[tokio::test]
    async fn test_migrate_duplicate_legacy_ids_once() {
        let fx = Fixture::new();
        let outcome = migrate(
            &fx,
            json!([
                { "id": "u1", "username": "first", "role": "admin" },
                { "id": "u1", "username": "second", "role": "admin" }
            ]),
        )
        .await;

        assert_eq!(outcome, MigrationOutcome::Migrated(1));
        assert_eq!(fx.users()[0]["username"], "first");
    }

    #[tokio::test]
    async fn test_migrate_skips_records_without_id() {
        let fx = Fixture::new();
        let outcome = migrate(&fx, json!([{ "username": "ghost", "role": "admin" }])).await;

        assert_eq!(outcome, MigrationOutcome::NothingToMigrate);
        assert_eq!(fx.logger.count("warn"), 1);
    }

    #[tokio::test]
    async fn test_migrate_transforms_to_camel_case() {
        let fx = Fixture::new();
        migrate(
            &fx,
            json!([{
                "id": "u1",
                "username": "legacy",
                "role": "admin",
                "password_hash": "hash",
                "totp_enabled": true,
                "created_at": "2023-01-01T00:00:00Z",
                "updated_at": "2023-02-01T00:00:00Z",
                "last_login_at": "2023-03-01T00:00:00Z",
                "is_active": false,
                "certificate_cn": "cn=legacy",
                "display_name": "Legacy Admin",
                "onboarding_step": 2
            }]),
        )
        .await;

        let user = &fx.users()[0];
        assert_eq!(user["passwordHash"], "hash");
        assert_eq!(user["totpEnabled"], true);
        assert_eq!(user["createdAt"], "2023-01-01T00:00:00Z");
        assert_eq!(user["updatedAt"], "2023-02-01T00:00:00Z");
        assert_eq!(user["lastLoginAt"], "2023-03-01T00:00:00Z");
        assert_eq!(user["isActive"], false);
        assert_eq!(user["certificateCn"], "cn=legacy");
        assert_eq!(user["displayName"], "Legacy Admin");
        assert_eq!(user["onboardingStep"], 2);
        let object = user.as_object().expect("object");
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("is_active"));
    }

    #[tokio::test]
    async fn test_migrate_identity_fallbacks() {
        let fx = Fixture::new();
        migrate(
            &fx,
            json!([
                { "id": "u1", "email": "jo@example.com", "role": "admin" },
                { "id": "u2", "handle": "only-handle", "role": "admin" },
                { "id": "u3", "username": "", "email": "kim@example.com", "handle": "kh", "role": "admin" }
            ]),
        )
        .await;

        let users = fx.users();
        assert_eq!(users[0]["username"], "jo@example.com");
        assert_eq!(users[0]["handle"], "jo");
        assert_eq!(users[0]["email"], "jo@example.com");
        assert_eq!(users[1]["username"], "only-handle");
        assert_eq!(users[1]["handle"], "only-handle");
        assert_eq!(users[2]["username"], "kim@example.com");
        assert_eq!(users[2]["handle"], "kh");
    }

    #[tokio::test]
    async fn test_migrate_empty_email_local_part() {
        let fx = Fixture::new();
        migrate(&fx, json!([{ "id": "u1", "email": "@example.com", "role": "admin" }])).await;

        let user = &fx.users()[0];
        assert_eq!(user["username"], "@example.com");
        assert_eq!(user["handle"], "");
    }

    #[tokio::test]
    async fn test_migrate_keeps_usable_parts_of_off_shape_fields() {
        let fx = Fixture::new();
        let outcome = migrate(
            &fx,
            json!([{
                "id": "u1",
                "permissions": ["read", "write", 7],
                "preferences": { "theme": "dark", "emailNotifications": "yes" }
            }]),
        )
        .await;

        assert_eq!(outcome, MigrationOutcome::Migrated(1));
        let user = &fx.users()[0];
        assert_eq!(user["permissions"], json!(["read", "write"]));
        assert_eq!(
            user["preferences"],
            json!({ "theme": "dark", "emailNotifications": "yes" })
        );
    }

    #[tokio::test]
    async fn test_migrate_password_and_totp_fallbacks() {
        let fx = Fixture::new();
        migrate(
            &fx,
            json!([
                { "id": "u1", "role": "admin", "password": "legacy-hash", "totp_secret": "secret-ref" },
                { "id": "u2", "role": "admin", "passwordHash": "camel", "password": "ignored" }
            ]),
        )
        .await;

        let users = fx.users();
        assert_eq!(users[0]["passwordHash"], "legacy-hash");
        assert_eq!(users[0]["totpSecretId"], "secret-ref");
        assert_eq!(users[1]["passwordHash"], "camel");
        assert!(!users[0].as_object().expect("object").contains_key("password"));
    }

    #[tokio::test]
    async fn test_migrate_defaults_timestamps_to_now() {
        let fx = Fixture::new();
        migrate(&fx, json!([{ "id": "u1", "role": "admin" }])).await;

        let user = &fx.users()[0];
        for key in ["createdAt", "updatedAt"] {
            let stamp = user[key].as_str().expect("timestamp");
            assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
            assert!(stamp.ends_with('Z'));
        }
        assert_eq!(user["lastLoginAt"], Value::Null);
        assert_eq!(user["totpSecretId"], Value::Null);
        assert_eq!(user["certificateCn"], Value::Null);
    }

    #[tokio::test]
    async fn test_migrate_appends_after_existing_in_order() {
        let fx = Fixture::new();
        fx.write_json(
            "admin-users.json",
            &json!([{ "id": "existing", "role": "super_admin", "is_active": true }]),
        );
        fx.write_json(
            "users.json",
            &json!([
                { "id": "a", "role": "admin" },
                { "id": "b", "username": "x" },
                { "id": "c", "is_admin": "yes" }
            ]),
        );

        let outcome = fx.bootstrapper.migrate_legacy_users().await;
        assert_eq!(outcome, MigrationOutcome::Migrated(2));

        let users = fx.users();
        let ids: Vec<&str> = users.iter().filter_map(|u| u["id"].as_str()).collect();
        assert_eq!(ids, ["existing", "a", "c"]);
        // Existing records are written back as they were, not renormalized.
        assert_eq!(users[0], json!({ "id": "existing", "role": "super_admin", "is_active": true }));
    }

    #[tokio::test]
    async fn test_migrate_accepts_container_shape() {
        let fx = Fixture::new();
        let outcome = migrate(&fx, json!({ "users": [{ "id": "u1", "role": "editor" }] })).await;

        assert_eq!(outcome, MigrationOutcome::Migrated(1));
        assert_eq!(fx.users()[0]["permissions"], json!(["read"]));
    }

    #[tokio::test]
    async fn test_migrate_invalid_legacy_json_is_absorbed() {
        let fx = Fixture::new();
        fx.write("admin-users.json", "[]");
        fx.write("users.json", "{ not json");

        let outcome = fx.bootstrapper.migrate_legacy_users().await;
        assert!(matches!(outcome, MigrationOutcome::Failed(_)));
        assert_eq!(fx.logger.count("error"), 1);
        assert_eq!(fx.read("admin-users.json"), "[]");
    }

    #[tokio::test]
    async fn test_migrate_missing_canonical_file_is_absorbed() {
        let fx = Fixture::new();
        fx.write_json("users.json", &json!([{ "id": "u1", "role": "admin" }]));

        let outcome = fx.bootstrapper.migrate_legacy_users().await;
        assert!(matches!(outcome, MigrationOutcome::Failed(_)));
        assert!(!fx.path("admin-users.json").exists());
    }

    // -----------------------------------------------------------------
    // ensure_default_admin
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_default_admin_created_when_empty() {
        let fx = Fixture::new();
        fx.write("admin-users.json", "[]");

        let outcome = fx.bootstrapper.ensure_default_admin().await.expect("ensure");
        assert_eq!(outcome, DefaultAdminOutcome::Created);

        let users = fx.users();
        assert_eq!(users.len(), 1);
        let admin = &users[0];
        assert_eq!(admin["id"], DEFAULT_ADMIN_ID);
        assert_eq!(admin["username"], "admin");
        assert_eq!(admin["email"], "admin@example.com");
        assert_eq!(admin["handle"], "admin");
        assert_eq!(admin["passwordHash"], DEFAULT_ADMIN_PASSWORD_HASH);
        assert_eq!(admin["totpSecretId"], Value::Null);
        assert_eq!(admin["totpEnabled"], false);
        assert_eq!(admin["isActive"], true);
        assert_eq!(admin["role"], "super_admin");
        assert_eq!(admin["certificateCn"], Value::Null);
        assert_eq!(admin["lastLoginAt"], Value::Null);
        assert_eq!(admin["permissions"], json!(["all"]));
        for key in ["createdAt", "updatedAt"] {
            let stamp = admin[key].as_str().expect("timestamp");
            assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
        }
    }

    #[tokio::test]
    async fn test_default_admin_skipped_for_active_camel_case() {
        let fx = Fixture::new();
        let existing = r#"[{"id":"u1","role":"admin","isActive":true}]"#;
        fx.write("admin-users.json", existing);

        let outcome = fx.bootstrapper.ensure_default_admin().await.expect("ensure");
        assert_eq!(outcome, DefaultAdminOutcome::AlreadyPresent);
        assert_eq!(fx.read("admin-users.json"), existing);
    }

    #[tokio::test]
    async fn test_default_admin_skipped_for_active_snake_case() {
        let fx = Fixture::new();
        let existing = r#"[{"id":"u1","role":"admin","is_active":true}]"#;
        fx.write("admin-users.json", existing);

        let outcome = fx.bootstrapper.ensure_default_admin().await.expect("ensure");
        assert_eq!(outcome, DefaultAdminOutcome::AlreadyPresent);
        assert_eq!(fx.read("admin-users.json"), existing);
    }

    #[tokio::test]
    async fn test_default_admin_appended_after_inactive_users() {
        let fx = Fixture::new();
        fx.write("admin-users.json", r#"[{"id":"u1","role":"admin","isActive":false}]"#);

        let outcome = fx.bootstrapper.ensure_default_admin().await.expect("ensure");
        assert_eq!(outcome, DefaultAdminOutcome::Created);

        let users = fx.users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0], json!({ "id": "u1", "role": "admin", "isActive": false }));
        assert_eq!(users[1]["id"], DEFAULT_ADMIN_ID);
        assert_eq!(users[1]["role"], "super_admin");
    }

    #[tokio::test]
    async fn test_default_admin_requires_boolean_true() {
        let fx = Fixture::new();
        fx.write("admin-users.json", r#"[{"id":"u1","isActive":"yes"}]"#);

        let outcome = fx.bootstrapper.ensure_default_admin().await.expect("ensure");
        assert_eq!(outcome, DefaultAdminOutcome::Created);
    }

    #[tokio::test]
    async fn test_default_admin_writes_two_space_json() {
        let fx = Fixture::new();
        fx.write("admin-users.json", "[]");
        fx.bootstrapper.ensure_default_admin().await.expect("ensure");

        let body = fx.read("admin-users.json");
        assert!(body.starts_with("[\n  {\n    \"id\": "), "{body}");
    }

    #[tokio::test]
    async fn test_default_admin_missing_file_is_fatal() {
        let fx = Fixture::new();
        let err = fx
            .bootstrapper
            .ensure_default_admin()
            .await
            .expect_err("missing users file");
        assert!(err.is_not_found());
        assert_eq!(fx.logger.count("error"), 1);
    }

    #[tokio::test]
    async fn test_default_admin_invalid_json_is_fatal() {
        let fx = Fixture::new();
        fx.write("admin-users.json", "{ broken");

        let err = fx
            .bootstrapper
            .ensure_default_admin()
            .await
            .expect_err("invalid json");
        assert!(matches!(err, crate::StoreError::Json { .. }));
    }

    // -----------------------------------------------------------------
    // run
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_run_on_empty_directory() {
        let fx = Fixture::new();
        let report = fx.bootstrapper.run().await.expect("run");

        assert_eq!(report.files.created.len(), 2);
        assert_eq!(report.migration, MigrationOutcome::NoLegacyFile);
        assert_eq!(report.default_admin, DefaultAdminOutcome::Created);
        assert_eq!(fx.users().len(), 1);
    }

    #[tokio::test]
    async fn test_run_migration_failure_does_not_block_default_admin() {
        let fx = Fixture::new();
        fx.write("users.json", "not json at all");

        let report = fx.bootstrapper.run().await.expect("run");
        assert!(matches!(report.migration, MigrationOutcome::Failed(_)));
        assert_eq!(report.default_admin, DefaultAdminOutcome::Created);
    }

    #[tokio::test]
    async fn test_run_migrated_active_admin_suppresses_default() {
        let fx = Fixture::new();
        fx.write_json("users.json", &json!([{ "id": "u1", "username": "a", "role": "admin" }]));

        let report = fx.bootstrapper.run().await.expect("run");
        assert_eq!(report.migration, MigrationOutcome::Migrated(1));
        assert_eq!(report.default_admin, DefaultAdminOutcome::AlreadyPresent);
        assert_eq!(fx.users().len(), 1);
    }

    #[tokio::test]
    async fn test_run_propagates_ensure_files_error() {
        let fx = Fixture::new();
        fx.write("logs", "blocking file");

        assert!(fx.bootstrapper.run().await.is_err());
        assert!(!fx.path("admin-users.json").exists());
    }

    #[tokio::test]
    async fn test_run_propagates_default_admin_error() {
        let fx = Fixture::new();
        fx.write("admin-users.json", "{ broken");

        let err = fx.bootstrapper.run().await.expect_err("broken users file");
        assert!(matches!(err, crate::StoreError::Json { .. }));
    }
}
