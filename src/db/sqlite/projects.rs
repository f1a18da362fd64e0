use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_optional_uuid, parse_uuid};
use crate::{
    db::{
        error::DbResult,
        repos::{ProjectRepo, name_contains},
    },
    models::{CANCELLED_STATUS, Project},
};

pub struct SqliteProjectRepo {
    pool: SqlitePool,
}

impl SqliteProjectRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_project(row: &SqliteRow) -> DbResult<Project> {
        Ok(Project {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
            name: row.get("name"),
            booking_id: parse_optional_uuid(row.get("booking_id"))?,
            status: row.get("status"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl ProjectRepo for SqliteProjectRepo {
    async fn get_active_by_id(&self, id: Uuid) -> DbResult<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, booking_id, status, created_at
            FROM projects
            WHERE id = ? AND LOWER(status) <> ?
            "#,
        )
        .bind(id.to_string())
        .bind(CANCELLED_STATUS)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_project).transpose()
    }

    async fn find_active_by_booking(&self, booking_id: Uuid) -> DbResult<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, booking_id, status, created_at
            FROM projects
            WHERE booking_id = ? AND LOWER(status) <> ?
            ORDER BY julianday(created_at) ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(booking_id.to_string())
        .bind(CANCELLED_STATUS)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_project).transpose()
    }

    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<Project>> {
        // LOWER() in SQLite only folds ASCII, so names are compared here.
        let rows = sqlx::query(
            r#"
            SELECT id, organization_id, name, booking_id, status, created_at
            FROM projects
            WHERE LOWER(status) <> ?
            ORDER BY julianday(created_at) ASC, id ASC
            "#,
        )
        .bind(CANCELLED_STATUS)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .find(|row| name_contains(&row.get::<String, _>("name"), needle))
            .map(Self::parse_project)
            .transpose()
    }
}
