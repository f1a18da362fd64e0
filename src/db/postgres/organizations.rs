use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    db::{error::DbResult, repos::OrganizationRepo},
    models::Organization,
};

pub struct PostgresOrganizationRepo {
    read_pool: PgPool,
}

impl PostgresOrganizationRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        Self {
            read_pool: read_pool.unwrap_or(write_pool),
        }
    }

    fn parse_organization(row: &PgRow) -> Organization {
        Organization {
            id: row.get("id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl OrganizationRepo for PostgresOrganizationRepo {
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Organization>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.as_ref().map(Self::parse_organization))
    }

    async fn first_created(&self) -> DbResult<Option<Organization>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM organizations
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.as_ref().map(Self::parse_organization))
    }
}
