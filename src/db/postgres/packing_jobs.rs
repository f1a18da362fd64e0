use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::{
    db::{
        error::DbResult,
        repos::{PackingJobRepo, contains_pattern},
    },
    models::{CANCELLED_STATUS, PackingJob},
};

pub struct PostgresPackingJobRepo {
    read_pool: PgPool,
}

impl PostgresPackingJobRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        Self {
            read_pool: read_pool.unwrap_or(write_pool),
        }
    }
}

#[async_trait]
impl PackingJobRepo for PostgresPackingJobRepo {
    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<PackingJob>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, status, created_at
            FROM packing_jobs
            WHERE name ILIKE $1 ESCAPE '\' AND LOWER(status) <> $2
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(contains_pattern(needle))
        .bind(CANCELLED_STATUS)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.map(|row| PackingJob {
            id: row.get("id"),
            organization_id: row.get("organization_id"),
            name: row.get("name"),
            status: row.get("status"),
            created_at: row.get("created_at"),
        }))
    }
}
