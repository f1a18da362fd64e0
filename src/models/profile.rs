use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Local profile for an identity-provider user. `id` is the identity id;
/// `email` is normalized and unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub organization_id: Option<Uuid>,
    pub sso_user: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert-or-overwrite input for a profile, keyed by `id`.
#[derive(Debug, Clone)]
pub struct UpsertProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub organization_id: Option<Uuid>,
    pub sso_user: bool,
}

/// Normalize an email for identity lookups: trimmed and lower-cased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
