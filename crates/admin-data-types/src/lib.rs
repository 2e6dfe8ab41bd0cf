//! # admin-data-types
//!
//! Admin user and admin activity log records, and the normalizer that
//! reconciles the two field naming conventions found in stored data:
//! - canonical: camelCase keys (`passwordHash`, `isActive`)
//! - legacy: snake_case keys (`password_hash`, `is_active`)
//!
//! Normalization never fails. Missing or mistyped fields fall back to the
//! next spelling, then to the field default, then stay unset.

pub mod activity;
mod fields;
pub mod user;

pub use activity::{
    denormalize_log, looks_legacy_log, normalize_log, normalize_log_list, unwrap_log_file,
    AdminActivityLog, LegacyActivityLog,
};
pub use fields::collection_items;
pub use user::{
    denormalize_user, looks_legacy_user, normalize_user, normalize_user_list, unwrap_user_file,
    AdminUser, ContentPageSettings, DarkModeOverride, LegacyAdminUser, Preferences,
    ProfileVisibility, SocialLinks,
};
