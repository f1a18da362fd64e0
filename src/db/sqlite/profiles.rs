use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use super::common::{parse_optional_uuid, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ProfileRepo,
    },
    models::{Profile, UpsertProfile},
};

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_profile(row: &SqliteRow) -> DbResult<Profile> {
        Ok(Profile {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            email: row.get("email"),
            full_name: row.get("full_name"),
            organization_id: parse_optional_uuid(row.get("organization_id"))?,
            sso_user: row.get("sso_user"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl ProfileRepo for SqliteProfileRepo {
    async fn get_by_email(&self, email: &str) -> DbResult<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, full_name, organization_id, sso_user, created_at, updated_at
            FROM profiles
            WHERE LOWER(email) = LOWER(?)
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_profile).transpose()
    }

    async fn upsert(&self, input: UpsertProfile) -> DbResult<Profile> {
        let now = chrono::Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, organization_id, sso_user, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                full_name = excluded.full_name,
                organization_id = excluded.organization_id,
                sso_user = excluded.sso_user,
                updated_at = excluded.updated_at
            RETURNING id, email, full_name, organization_id, sso_user, created_at, updated_at
            "#,
        )
        .bind(input.id.to_string())
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(input.organization_id.map(|id| id.to_string()))
        .bind(input.sso_user)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!("Profile with email '{}' belongs to another user", input.email),
            ),
            _ => DbError::from(e),
        })?;

        Self::parse_profile(&row)
    }
}
