use async_trait::async_trait;

use crate::{db::error::DbResult, models::PackingJob};

#[async_trait]
pub trait PackingJobRepo: Send + Sync {
    /// Oldest non-cancelled packing job whose name contains `needle`,
    /// case-insensitively.
    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<PackingJob>>;
}
