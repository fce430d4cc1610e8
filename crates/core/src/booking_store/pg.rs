use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cineslot_db::models::{Booking, Showtime};
use cineslot_db::{queries, PgPool};
use cineslot_types::{AppError, Result};
use uuid::Uuid;

use super::{BookingStore, InsertOutcome};

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn showtime(&self, showtime_id: Uuid) -> Result<Showtime> {
        queries::showtimes::find_by_id(&self.pool, showtime_id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("showtime {showtime_id}")))
    }

    async fn insert(
        &self,
        id: Uuid,
        user_id: Uuid,
        showtime_id: Uuid,
        booking_code: &str,
        seats: &[String],
        total_price_minor: i32,
        hold_expires_at: DateTime<Utc>,
    ) -> Result<InsertOutcome> {
        match queries::bookings::insert(
            &self.pool,
            id,
            user_id,
            showtime_id,
            booking_code,
            seats,
            total_price_minor,
            hold_expires_at,
        )
        .await
        {
            Ok(booking) => Ok(InsertOutcome::Created(booking)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::CodeCollision),
            Err(e) => Err(AppError::StorageUnavailable(e.to_string())),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        queries::bookings::find_by_id(&self.pool, id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>> {
        queries::bookings::find_by_code(&self.pool, code)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<Option<Booking>> {
        queries::bookings::transition_status(&self.pool, id, from, to)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn extend_hold(&self, id: Uuid, new_expires_at: DateTime<Utc>) -> Result<Option<Booking>> {
        queries::bookings::extend_hold(&self.pool, id, new_expires_at)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn find_expired_pending(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Booking>> {
        queries::bookings::find_expired_pending(&self.pool, before, limit)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}
