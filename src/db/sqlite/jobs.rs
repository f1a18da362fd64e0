use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{error::DbResult, repos::JobRepo},
    models::Job,
};

pub struct SqliteJobRepo {
    pool: SqlitePool,
}

impl SqliteJobRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepo for SqliteJobRepo {
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Job>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, status, created_at
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Job {
                id: parse_uuid(&row.get::<String, _>("id"))?,
                organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
                name: row.get("name"),
                status: row.get("status"),
                created_at: row.get("created_at"),
            })),
            None => Ok(None),
        }
    }
}
