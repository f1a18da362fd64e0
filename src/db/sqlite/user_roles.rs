use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{RoleSync, UserRoleRepo},
    },
    models::AppRole,
};

pub struct SqliteUserRoleRepo {
    pool: SqlitePool,
}

impl SqliteUserRoleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_role(raw: String) -> DbResult<AppRole> {
    raw.parse().map_err(DbError::Internal)
}

#[async_trait]
impl UserRoleRepo for SqliteUserRoleRepo {
    async fn list_for_user(&self, user_id: Uuid) -> DbResult<Vec<AppRole>> {
        let rows = sqlx::query("SELECT role FROM user_roles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        let roles = rows
            .into_iter()
            .map(|row| parse_role(row.get("role")))
            .collect::<DbResult<BTreeSet<_>>>()?;

        Ok(roles.into_iter().collect())
    }

    async fn replace_roles(&self, user_id: Uuid, roles: &[AppRole]) -> DbResult<RoleSync> {
        let desired: BTreeSet<AppRole> = roles.iter().copied().collect();
        let now = chrono::Utc::now();

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query("SELECT role FROM user_roles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| parse_role(row.get("role")))
            .collect::<DbResult<BTreeSet<_>>>()?;

        let removed: Vec<AppRole> = current.difference(&desired).copied().collect();
        let added: Vec<AppRole> = desired.difference(&current).copied().collect();

        for role in &removed {
            sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role = ?")
                .bind(user_id.to_string())
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
        }

        for role in &added {
            sqlx::query("INSERT INTO user_roles (user_id, role, created_at) VALUES (?, ?, ?)")
                .bind(user_id.to_string())
                .bind(role.as_str())
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(RoleSync { added, removed })
    }
}
