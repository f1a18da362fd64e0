use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::error::DbResult, models::Job};

#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Job>>;
}
