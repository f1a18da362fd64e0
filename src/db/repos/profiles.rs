use async_trait::async_trait;

use crate::{
    db::error::DbResult,
    models::{Profile, UpsertProfile},
};

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    /// Case-insensitive email lookup. Callers pass a normalized email.
    async fn get_by_email(&self, email: &str) -> DbResult<Option<Profile>>;
    /// Insert the profile, or overwrite every attribute of the existing row
    /// with the same id.
    async fn upsert(&self, input: UpsertProfile) -> DbResult<Profile>;
}
