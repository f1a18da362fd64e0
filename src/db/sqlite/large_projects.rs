use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use super::common::parse_uuid;
use crate::{
    db::{
        error::DbResult,
        repos::{LargeProjectRepo, name_contains},
    },
    models::{CANCELLED_STATUS, LargeProject},
};

pub struct SqliteLargeProjectRepo {
    pool: SqlitePool,
}

impl SqliteLargeProjectRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_large_project(row: &SqliteRow) -> DbResult<LargeProject> {
    Ok(LargeProject {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
        name: row.get("name"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl LargeProjectRepo for SqliteLargeProjectRepo {
    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<LargeProject>> {
        let rows = sqlx::query(
            r#"
            SELECT id, organization_id, name, status, created_at
            FROM large_projects
            WHERE LOWER(status) <> ?
            ORDER BY julianday(created_at) ASC, id ASC
            "#,
        )
        .bind(CANCELLED_STATUS)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .find(|row| name_contains(&row.get::<String, _>("name"), needle))
            .map(parse_large_project)
            .transpose()
    }
}
