use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    db::{error::DbResult, repos::JobRepo},
    models::Job,
};

pub struct PostgresJobRepo {
    read_pool: PgPool,
}

impl PostgresJobRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        Self {
            read_pool: read_pool.unwrap_or(write_pool),
        }
    }
}

#[async_trait]
impl JobRepo for PostgresJobRepo {
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Job>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, name, status, created_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.map(|row| Job {
            id: row.get("id"),
            organization_id: row.get("organization_id"),
            name: row.get("name"),
            status: row.get("status"),
            created_at: row.get("created_at"),
        }))
    }
}
