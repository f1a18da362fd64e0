use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::error::DbResult, models::Project};

/// Project lookups used by invoice matching. "Active" excludes cancelled
/// projects; when several rows qualify the oldest one is returned.
#[async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn get_active_by_id(&self, id: Uuid) -> DbResult<Option<Project>>;
    async fn find_active_by_booking(&self, booking_id: Uuid) -> DbResult<Option<Project>>;
    /// Case-insensitive substring match on the project name.
    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<Project>>;
}
