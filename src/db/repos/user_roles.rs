use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::error::DbResult, models::AppRole};

/// Changes applied by [`UserRoleRepo::replace_roles`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSync {
    pub added: Vec<AppRole>,
    pub removed: Vec<AppRole>,
}

impl RoleSync {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[async_trait]
pub trait UserRoleRepo: Send + Sync {
    /// Roles held by the user, sorted.
    async fn list_for_user(&self, user_id: Uuid) -> DbResult<Vec<AppRole>>;

    /// Make the stored role set equal `roles`.
    ///
    /// Runs in one transaction: roles no longer present are deleted, new ones
    /// inserted, unchanged rows are left alone.
    async fn replace_roles(&self, user_id: Uuid, roles: &[AppRole]) -> DbResult<RoleSync>;
}
