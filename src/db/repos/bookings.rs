use async_trait::async_trait;

use crate::{db::error::DbResult, models::Booking};

#[async_trait]
pub trait BookingRepo: Send + Sync {
    /// Exact, case-sensitive booking number lookup. The oldest booking wins
    /// if the number is reused.
    async fn get_by_booking_number(&self, booking_number: &str) -> DbResult<Option<Booking>>;
}
