use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ProfileRepo,
    },
    models::{Profile, UpsertProfile},
};

pub struct PostgresProfileRepo {
    write_pool: PgPool,
    read_pool: PgPool,
}

impl PostgresProfileRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        let read_pool = read_pool.unwrap_or_else(|| write_pool.clone());
        Self {
            write_pool,
            read_pool,
        }
    }

    fn parse_profile(row: &PgRow) -> Profile {
        Profile {
            id: row.get("id"),
            email: row.get("email"),
            full_name: row.get("full_name"),
            organization_id: row.get("organization_id"),
            sso_user: row.get("sso_user"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl ProfileRepo for PostgresProfileRepo {
    async fn get_by_email(&self, email: &str) -> DbResult<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, full_name, organization_id, sso_user, created_at, updated_at
            FROM profiles
            WHERE LOWER(email) = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.as_ref().map(Self::parse_profile))
    }

    async fn upsert(&self, input: UpsertProfile) -> DbResult<Profile> {
        let now = chrono::Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, organization_id, sso_user, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                organization_id = EXCLUDED.organization_id,
                sso_user = EXCLUDED.sso_user,
                updated_at = EXCLUDED.updated_at
            RETURNING id, email, full_name, organization_id, sso_user, created_at, updated_at
            "#,
        )
        .bind(input.id)
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(input.organization_id)
        .bind(input.sso_user)
        .bind(now)
        .fetch_one(&self.write_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!("Profile with email '{}' belongs to another user", input.email),
            ),
            _ => DbError::from(e),
        })?;

        Ok(Self::parse_profile(&row))
    }
}
