use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cineslot_db::models::{Booking, Showtime};
use cineslot_types::{AppError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BookingStore, InsertOutcome};

#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    showtimes: Arc<Mutex<HashMap<Uuid, Showtime>>>,
    bookings: Arc<Mutex<HashMap<Uuid, Booking>>>,
    codes: Arc<Mutex<HashMap<String, Uuid>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the showtime a test will book against. No live
    /// `showtimes` table behind this store — fixtures provide one
    /// directly.
    pub async fn register_showtime(&self, showtime: Showtime) {
        self.showtimes.lock().await.insert(showtime.id, showtime);
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn showtime(&self, showtime_id: Uuid) -> Result<Showtime> {
        self.showtimes
            .lock()
            .await
            .get(&showtime_id)
            .cloned()
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
        let mut codes = self.codes.lock().await;
        if codes.contains_key(booking_code) {
            return Ok(InsertOutcome::CodeCollision);
        }

        let now = Utc::now();
        let booking = Booking {
            id,
            user_id,
            showtime_id,
            booking_code: booking_code.to_string(),
            seats: seats.to_vec(),
            total_price_minor,
            status: "pending".to_string(),
            hold_expires_at: Some(hold_expires_at),
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        codes.insert(booking_code.to_string(), id);
        self.bookings.lock().await.insert(id, booking.clone());

        Ok(InsertOutcome::Created(booking))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.bookings.lock().await.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>> {
        let codes = self.codes.lock().await;
        let Some(id) = codes.get(code) else {
            return Ok(None);
        };
        Ok(self.bookings.lock().await.get(id).cloned())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<Option<Booking>> {
        let mut bookings = self.bookings.lock().await;
        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != from {
            return Ok(None);
        }
        booking.status = to.to_string();
        booking.updated_at = Utc::now();
        if to == "cancelled" {
            booking.cancelled_at = Some(booking.updated_at);
        }
        Ok(Some(booking.clone()))
    }

    async fn extend_hold(&self, id: Uuid, new_expires_at: DateTime<Utc>) -> Result<Option<Booking>> {
        let mut bookings = self.bookings.lock().await;
        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != "pending" {
            return Ok(None);
        }
        booking.hold_expires_at = Some(new_expires_at);
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }

    async fn find_expired_pending(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Booking>> {
        let bookings = self.bookings.lock().await;
        let mut expired: Vec<Booking> = bookings
            .values()
            .filter(|b| b.status == "pending" && b.hold_expires_at.map_or(false, |e| e < before))
            .cloned()
            .collect();
        expired.sort_by_key(|b| b.hold_expires_at);
        expired.truncate(limit.max(0) as usize);
        Ok(expired)
    }
}
