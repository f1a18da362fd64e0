use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::{
    db::{
        error::DbResult,
        repos::{LargeProjectRepo, contains_pattern},
    },
    models::{CANCELLED_STATUS, LargeProject},
};

pub struct PostgresLargeProjectRepo {
    read_pool: PgPool,
}

impl PostgresLargeProjectRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        Self {
            read_pool: read_pool.unwrap_or(write_pool),
        }
    }
}

#[async_trait]
impl LargeProjectRepo for PostgresLargeProjectRepo {
    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<LargeProject>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, status, created_at
            FROM large_projects
            WHERE name ILIKE $1 ESCAPE '\' AND LOWER(status) <> $2
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(contains_pattern(needle))
        .bind(CANCELLED_STATUS)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.map(|row| LargeProject {
            id: row.get("id"),
            organization_id: row.get("organization_id"),
            name: row.get("name"),
            status: row.get("status"),
            created_at: row.get("created_at"),
        }))
    }
}
