//! Admin user records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields::{collection_items, decode_into, RawRecord};

/// Keys that only appear in legacy (snake_case) user records.
const LEGACY_USER_KEYS: [&str; 10] = [
    "password_hash",
    "totp_secret_id",
    "totp_enabled",
    "created_at",
    "updated_at",
    "last_login_at",
    "is_active",
    "certificate_cn",
    "invited_by",
    "invitation_token",
];

/// Who can see an admin's public profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    Private,
    Draft,
    Public,
}

/// Forced colour scheme for content pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkModeOverride {
    Light,
    Dark,
}

/// Social profile links. Unknown platforms are kept in `other`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Per-admin UI preferences. Unknown keys are kept in `other`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_page_settings: Option<ContentPageSettings>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl SocialLinks {
    /// Lenient decode. Known keys holding something other than a string
    /// are kept verbatim in `other`.
    fn from_fields(fields: &Map<String, Value>) -> Self {
        let mut links = Self::default();
        for (key, value) in fields {
            let placed = match key.as_str() {
                "twitter" => decode_into(&mut links.twitter, value),
                "instagram" => decode_into(&mut links.instagram, value),
                "facebook" => decode_into(&mut links.facebook, value),
                _ => false,
            };
            if !placed {
                links.other.insert(key.clone(), value.clone());
            }
        }
        links
    }
}

impl Preferences {
    /// Lenient decode. Known keys of the wrong shape, including a
    /// `contentPageSettings` that does not fit, are kept verbatim in `other`.
    fn from_fields(fields: &Map<String, Value>) -> Self {
        let mut prefs = Self::default();
        for (key, value) in fields {
            let placed = match key.as_str() {
                "emailNotifications" => decode_into(&mut prefs.email_notifications, value),
                "theme" => decode_into(&mut prefs.theme, value),
                "timezone" => decode_into(&mut prefs.timezone, value),
                "contentPageSettings" => decode_into(&mut prefs.content_page_settings, value),
                _ => false,
            };
            if !placed {
                prefs.other.insert(key.clone(), value.clone());
            }
        }
        prefs
    }
}

/// Overrides applied when an admin views content pages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPageSettings {
    #[serde(default)]
    pub force_theme: Option<String>,
    #[serde(default)]
    pub force_dark_mode: Option<DarkModeOverride>,
    #[serde(default)]
    pub force_a11y: bool,
}

/// A privileged account in canonical (camelCase) shape.
///
/// Fields without a default are `None` when neither spelling supplied them
/// and are omitted on serialization. `totp_secret_id`, `last_login_at` and
/// `certificate_cn` default to null and always serialize.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    /// Opaque identifier, unique within the collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Name shown in the admin UI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Public handle, usually the email local part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Contact address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Opaque password hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Reference to the stored TOTP secret.
    pub totp_secret_id: Option<String>,
    /// Two-factor login enabled.
    pub totp_enabled: bool,
    /// RFC 3339 creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// RFC 3339 time of the last change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// RFC 3339 time of the last login, null if never.
    pub last_login_at: Option<String>,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    /// Set until the first successful login.
    pub first_login: bool,
    /// Onboarding wizard still pending.
    pub needs_onboarding: bool,
    /// Last completed onboarding step.
    pub onboarding_step: u32,
    /// Role name, e.g. `super_admin`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Granted permissions, in stored order.
    pub permissions: Vec<String>,
    /// Common name of the client certificate bound to the account.
    pub certificate_cn: Option<String>,
    /// Id of the inviting admin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<String>,
    /// Pending invitation token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_token: Option<String>,
    /// Expiry of `invitation_token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_expires: Option<String>,
    /// Who can see the public profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_visibility: Option<ProfileVisibility>,
    /// Profile photo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    /// Short profile text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Pronouns shown on the profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    /// Links to social profiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    /// UI preferences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    /// Unused two-factor backup codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_codes: Option<Vec<String>>,
}

/// The same record spelled with legacy (snake_case) keys.
///
/// Produced by [`denormalize_user`]; a pure rename, no defaults applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegacyAdminUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub totp_secret_id: Option<String>,
    pub totp_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub last_login_at: Option<String>,
    pub is_active: bool,
    pub first_login: bool,
    pub needs_onboarding: bool,
    pub onboarding_step: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub permissions: Vec<String>,
    pub certificate_cn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_visibility: Option<ProfileVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_codes: Option<Vec<String>>,
}

impl AdminUser {
    /// Identifier, or `""` when the record has none.
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// Reshape a raw user record of either convention into canonical form.
///
/// `null` passes through as `None`.
pub fn normalize_user(raw: &Value) -> Option<AdminUser> {
    if raw.is_null() {
        return None;
    }
    let r = RawRecord::new(raw);

    Some(AdminUser {
        id: r.string(&["id"]),
        username: r.string(&["username"]),
        display_name: r.string(&["displayName", "display_name"]),
        handle: r.string(&["handle"]),
        email: r.string(&["email"]),
        password_hash: r.string(&["passwordHash", "password_hash"]),
        totp_secret_id: r.string(&["totpSecretId", "totp_secret_id", "totp_secret"]),
        totp_enabled: r.boolean(&["totpEnabled", "totp_enabled"]).unwrap_or(false),
        created_at: r.string(&["createdAt", "created_at"]),
        updated_at: r.string(&["updatedAt", "updated_at"]),
        last_login_at: r.string(&["lastLoginAt", "last_login_at"]),
        is_active: r.boolean(&["isActive", "is_active"]).unwrap_or(true),
        first_login: r.boolean(&["firstLogin", "first_login"]).unwrap_or(false),
        needs_onboarding: r
            .boolean(&["needsOnboarding", "needs_onboarding"])
            .unwrap_or(false),
        onboarding_step: r.step(&["onboardingStep", "onboarding_step"]).unwrap_or(0),
        role: r.string(&["role"]),
        permissions: r.strings(&["permissions"]).unwrap_or_default(),
        certificate_cn: r.string(&["certificateCn", "certificate_cn"]),
        invited_by: r.string(&["invitedBy", "invited_by"]),
        invitation_token: r.string(&["invitationToken", "invitation_token"]),
        invitation_expires: r.string(&["invitationExpires", "invitation_expires"]),
        profile_visibility: r.typed(&["profileVisibility", "profile_visibility"]),
        profile_photo: r.string(&["profilePhoto", "profile_photo"]),
        bio: r.string(&["bio"]),
        pronouns: r.string(&["pronouns"]),
        social_links: r
            .object(&["socialLinks", "social_links"])
            .map(SocialLinks::from_fields),
        preferences: r.object(&["preferences"]).map(Preferences::from_fields),
        backup_codes: r.strings(&["backupCodes", "backup_codes"]),
    })
}

/// Rename a canonical record back to legacy spellings.
pub fn denormalize_user(user: &AdminUser) -> LegacyAdminUser {
    let user = user.clone();
    LegacyAdminUser {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        handle: user.handle,
        email: user.email,
        password_hash: user.password_hash,
        totp_secret_id: user.totp_secret_id,
        totp_enabled: user.totp_enabled,
        created_at: user.created_at,
        updated_at: user.updated_at,
        last_login_at: user.last_login_at,
        is_active: user.is_active,
        first_login: user.first_login,
        needs_onboarding: user.needs_onboarding,
        onboarding_step: user.onboarding_step,
        role: user.role,
        permissions: user.permissions,
        certificate_cn: user.certificate_cn,
        invited_by: user.invited_by,
        invitation_token: user.invitation_token,
        invitation_expires: user.invitation_expires,
        profile_visibility: user.profile_visibility,
        profile_photo: user.profile_photo,
        bio: user.bio,
        pronouns: user.pronouns,
        social_links: user.social_links,
        preferences: user.preferences,
        backup_codes: user.backup_codes,
    }
}

/// Normalize every element, keeping order and length.
pub fn normalize_user_list(raw: &[Value]) -> Vec<Option<AdminUser>> {
    raw.iter().map(normalize_user).collect()
}

/// True if the record carries at least one legacy-only key.
///
/// A heuristic: a canonical record with a stray legacy key also matches.
pub fn looks_legacy_user(raw: &Value) -> bool {
    RawRecord::new(raw).has_any(&LEGACY_USER_KEYS)
}

/// Normalize the users held by a file body (bare array or `{ "users": [...] }`).
pub fn unwrap_user_file(data: &Value) -> Vec<Option<AdminUser>> {
    normalize_user_list(collection_items(data, "users"))
}
