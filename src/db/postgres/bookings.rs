use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::{
    db::{error::DbResult, repos::BookingRepo},
    models::Booking,
};

pub struct PostgresBookingRepo {
    read_pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        Self {
            read_pool: read_pool.unwrap_or(write_pool),
        }
    }
}

#[async_trait]
impl BookingRepo for PostgresBookingRepo {
    async fn get_by_booking_number(&self, booking_number: &str) -> DbResult<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, booking_number, client, assigned_project_id, created_at
            FROM bookings
            WHERE booking_number = $1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(booking_number)
        .fetch_optional(&self.read_pool)
        .await?;

        Ok(row.map(|row| Booking {
            id: row.get("id"),
            organization_id: row.get("organization_id"),
            booking_number: row.get("booking_number"),
            client: row.get("client"),
            assigned_project_id: row.get("assigned_project_id"),
            created_at: row.get("created_at"),
        }))
    }
}
