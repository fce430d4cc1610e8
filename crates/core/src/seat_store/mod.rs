//! `ShowtimeSeatStore` (spec §4.1): the sole authority for seat-state
//! invariants I1-I3. A trait rather than a concrete Postgres type, keeping
//! storage and orchestration separate — `BookingEngine` depends on this
//! trait, not on `cineslot-db` directly, so the property tests for P1-P8
//! can run against an in-memory double instead of a live database.

pub mod mem;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cineslot_types::Result;
use std::time::Duration;
use uuid::Uuid;

pub use mem::InMemorySeatStore;
pub use pg::PgSeatStore;

/// Outcome of a `try_hold` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldOutcome {
    Held,
    /// Every seat label that blocked the hold — already booked, live-held
    /// by someone else, or not a valid label for this showtime.
    Conflict(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldSeat {
    pub seat_label: String,
    pub holder_booking_id: Uuid,
    pub holder_user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatSnapshot {
    pub showtime_id: Uuid,
    pub capacity: i32,
    pub booked: Vec<String>,
    pub held: Vec<HeldSeat>,
    pub available_count: i64,
}

#[async_trait]
pub trait SeatStore: Send + Sync {
    /// All-or-nothing: either every seat in `seats` moves to held, or none
    /// do. Never observes a partial hold, even under concurrent callers for
    /// the same showtime (spec §4.1).
    async fn try_hold(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        holder_booking_id: Uuid,
        holder_user_id: Uuid,
        ttl: Duration,
    ) -> Result<HoldOutcome>;

    /// Moves the listed seats from held to booked. `holder_booking_id` is
    /// the booking whose confirm triggered this — `BookingEngine` always
    /// knows it, since it already loaded the booking row to validate the
    /// PENDING -> CONFIRMED transition before calling here. Idempotent:
    /// re-promoting already-booked seats is a no-op.
    async fn promote(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        holder_booking_id: Uuid,
    ) -> Result<()>;

    /// Removes holds for `seats` held by `holder_booking_id`. Also removes
    /// a booked seat's row-level ownership on the refund path (cancelling a
    /// CONFIRMED booking), since a seat's `holder_booking_id` is not
    /// cleared on promotion. Idempotent.
    async fn release(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        holder_booking_id: Uuid,
    ) -> Result<()>;

    /// Removes every hold whose `expires_at <= now`, scoped to one showtime
    /// or, when `showtime_id` is `None`, across all of them. Returns the
    /// count of seats reclaimed.
    async fn sweep_expired(&self, showtime_id: Option<Uuid>, now: DateTime<Utc>) -> Result<u64>;

    /// Purges expired holds inline before reading, so callers never observe
    /// a stale hold (spec §4.1).
    async fn snapshot(&self, showtime_id: Uuid) -> Result<SeatSnapshot>;

    /// Re-sets the expiry of every held seat in `seats` owned by
    /// `holder_booking_id` to `now + ttl` (`BookingEngine::extend`, spec
    /// §4.2). A no-op for seats not currently held by this booking.
    async fn extend(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        holder_booking_id: Uuid,
        ttl: Duration,
    ) -> Result<()>;
}
