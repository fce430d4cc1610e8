//! Booking persistence, abstracted the same way `SeatStore` abstracts seat
//! persistence: `BookingEngine` depends on this trait, not on
//! `cineslot_db::PgPool` directly, so the P1-P8 protocol tests can run
//! against an in-memory double instead of a live Postgres instance.

pub mod mem;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cineslot_db::models::{Booking, Showtime};
use cineslot_types::Result;
use uuid::Uuid;

pub use mem::InMemoryBookingStore;
pub use pg::PgBookingStore;

/// Result of attempting to insert a booking under a fresh booking code.
/// Split out from a plain `Result<Booking>` so `BookingEngine::create` can
/// tell "the code collided with an existing one, try another" apart from
/// every other storage failure, without string-matching a SQL error code.
pub enum InsertOutcome {
    Created(Booking),
    CodeCollision,
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Showtime row needed to price a new booking (I4/P7) and to validate
    /// seat count against capacity.
    async fn showtime(&self, showtime_id: Uuid) -> Result<Showtime>;

    #[allow(clippy::too_many_arguments)]
    async fn insert(
        &self,
        id: Uuid,
        user_id: Uuid,
        showtime_id: Uuid,
        booking_code: &str,
        seats: &[String],
        total_price_minor: i32,
        hold_expires_at: DateTime<Utc>,
    ) -> Result<InsertOutcome>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>>;

    /// Atomic `from` -> `to` transition; `None` if the row wasn't in `from`
    /// at the time of the update.
    async fn transition_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<Option<Booking>>;

    async fn extend_hold(&self, id: Uuid, new_expires_at: DateTime<Utc>) -> Result<Option<Booking>>;

    /// Bounded batch of PENDING bookings past their hold deadline, for the
    /// sweeper.
    async fn find_expired_pending(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Booking>>;
}
