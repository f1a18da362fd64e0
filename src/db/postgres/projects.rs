use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    db::{
        error::DbResult,
        repos::{ProjectRepo, contains_pattern},
    },
    models::{CANCELLED_STATUS, Project},
};

pub struct PostgresProjectRepo {
    read_pool: PgPool,
}

impl PostgresProjectRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        Self {
            read_pool: read_pool.unwrap_or(write_pool),
        }
    }

    fn parse_project(row: &PgRow) -> Project {
        Project {
            id: row.get("id"),
            organization_id: row.get("organization_id"),
            name: row.get("name"),
            booking_id: row.get("booking_id"),
            status: row.get("status"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl ProjectRepo for PostgresProjectRepo {
    async fn get_active_by_id(&self, id: Uuid) -> DbResult<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, booking_id, status, created_at
            FROM projects
            WHERE id = $1 AND LOWER(status) <> $2
            "#,
        )
        .bind(id)
        .bind(CANCELLED_STATUS)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.as_ref().map(Self::parse_project))
    }

    async fn find_active_by_booking(&self, booking_id: Uuid) -> DbResult<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, booking_id, status, created_at
            FROM projects
            WHERE booking_id = $1 AND LOWER(status) <> $2
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(booking_id)
        .bind(CANCELLED_STATUS)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.as_ref().map(Self::parse_project))
    }

    async fn find_active_by_name(&self, needle: &str) -> DbResult<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, booking_id, status, created_at
            FROM projects
            WHERE name ILIKE $1 ESCAPE '\' AND LOWER(status) <> $2
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(contains_pattern(needle))
        .bind(CANCELLED_STATUS)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.as_ref().map(Self::parse_project))
    }
}
