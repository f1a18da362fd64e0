use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use super::common::parse_uuid;
use crate::{
    db::{
        error::DbResult,
        repos::{PackingJobRepo, name_contains},
    },
    models::{CANCELLED_STATUS, PackingJob},
};

pub struct SqlitePackingJobRepo {
    pool: SqlitePool,
}

impl SqlitePackingJobRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_packing_job(row: &SqliteRow) -> DbResult<PackingJob> {
    Ok(PackingJob {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
        name: row.get("name"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl PackingJobRepo for SqlitePackingJobRepo {
    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<PackingJob>> {
        let rows = sqlx::query(
            r#"
            SELECT id, organization_id, name, status, created_at
            FROM packing_jobs
            WHERE LOWER(status) <> ?
            ORDER BY julianday(created_at) ASC, id ASC
            "#,
        )
        .bind(CANCELLED_STATUS)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .find(|row| name_contains(&row.get::<String, _>("name"), needle))
            .map(parse_packing_job)
            .transpose()
    }
}
