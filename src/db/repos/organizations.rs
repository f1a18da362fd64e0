use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::error::DbResult, models::Organization};

#[async_trait]
pub trait OrganizationRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Organization>>;
    /// Oldest organization in the store.
    async fn first_created(&self) -> DbResult<Option<Organization>>;
}
