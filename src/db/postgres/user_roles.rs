use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{RoleSync, UserRoleRepo},
    },
    models::AppRole,
};

pub struct PostgresUserRoleRepo {
    write_pool: PgPool,
    read_pool: PgPool,
}

impl PostgresUserRoleRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        let read_pool = read_pool.unwrap_or_else(|| write_pool.clone());
        Self {
            write_pool,
            read_pool,
        }
    }
}

fn parse_roles(raw: Vec<String>) -> DbResult<BTreeSet<AppRole>> {
    raw.into_iter()
        .map(|role| role.parse().map_err(DbError::Internal))
        .collect()
}

#[async_trait]
impl UserRoleRepo for PostgresUserRoleRepo {
    async fn list_for_user(&self, user_id: Uuid) -> DbResult<Vec<AppRole>> {
        let raw: Vec<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.read_pool)
            .await?;

        Ok(parse_roles(raw)?.into_iter().collect())
    }

    async fn replace_roles(&self, user_id: Uuid, roles: &[AppRole]) -> DbResult<RoleSync> {
        let desired: BTreeSet<AppRole> = roles.iter().copied().collect();

        let mut tx = self.write_pool.begin().await?;

        // Lock the user's rows so concurrent syncs for the same user serialize.
        let current: Vec<String> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await?;
        let current = parse_roles(current)?;

        let removed: Vec<AppRole> = current.difference(&desired).copied().collect();
        let added: Vec<AppRole> = desired.difference(&current).copied().collect();

        if !removed.is_empty() {
            let names: Vec<&str> = removed.iter().map(AppRole::as_str).collect();
            sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = ANY($2)")
                .bind(user_id)
                .bind(&names)
                .execute(&mut *tx)
                .await?;
        }

        for role in &added {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(RoleSync { added, removed })
    }
}
