use async_trait::async_trait;

use crate::{db::error::DbResult, models::LargeProject};

#[async_trait]
pub trait LargeProjectRepo: Send + Sync {
    /// Oldest non-cancelled large project whose name contains `needle`,
    /// case-insensitively.
    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<LargeProject>>;
}
