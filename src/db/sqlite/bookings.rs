use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::common::{parse_optional_uuid, parse_uuid};
use crate::{
    db::{error::DbResult, repos::BookingRepo},
    models::Booking,
};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepo for SqliteBookingRepo {
    async fn get_by_booking_number(&self, booking_number: &str) -> DbResult<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, booking_number, client, assigned_project_id, created_at
            FROM bookings
            WHERE booking_number = ?
            ORDER BY julianday(created_at) ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(booking_number)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Booking {
                id: parse_uuid(&row.get::<String, _>("id"))?,
                organization_id: parse_uuid(&row.get::<String, _>("organization_id"))?,
                booking_number: row.get("booking_number"),
                client: row.get("client"),
                assigned_project_id: parse_optional_uuid(row.get("assigned_project_id"))?,
                created_at: row.get("created_at"),
            })),
            None => Ok(None),
        }
    }
}
