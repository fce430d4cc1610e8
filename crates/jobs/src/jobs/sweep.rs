//! `ExpirySweeper` (spec §4.4): the backstop for abandoned PENDING bookings
//! and stale seat holds that no in-request path ever revisits. Two
//! independent cadences, matching the two places time can silently expire
//! state: a booking's hold can outlive its owner's attention even if the
//! seat rows beneath it were already reclaimed, and a showtime's held seats
//! can go stale even when nobody ever asks for that showtime's bookings.

use std::sync::Arc;

use chrono::Utc;
use cineslot_core::booking::BookingEngine;
use cineslot_db::queries::bookings as booking_queries;
use cineslot_db::PgPool;

/// Batch size per tick: bounds a single sweep's lock and round-trip
/// footprint when a backlog of expired bookings has piled up (e.g. after a
/// period of downtime).
const BOOKING_SWEEP_BATCH: i64 = 100;

/// Cancels every PENDING booking whose hold has expired, in bounded
/// batches, via `BookingEngine::cancel` so the seat release and status
/// transition happen through the same lifecycle rules a user-initiated
/// cancel would use. A failure on one booking is logged and does not stop
/// the rest of the batch — the next tick will pick up whatever is left.
pub async fn sweep_expired_bookings(pool: &PgPool, engine: &Arc<BookingEngine>) -> anyhow::Result<u64> {
    let now = Utc::now();
    let expired = booking_queries::find_expired_pending(pool, now, BOOKING_SWEEP_BATCH).await?;

    let mut cancelled = 0u64;
    for booking in &expired {
        match engine.cancel(booking.id).await {
            Ok(_) => cancelled += 1,
            Err(e) => {
                tracing::warn!(booking_id = %booking.id, error = %e, "failed to cancel expired booking");
            }
        }
    }

    if cancelled > 0 {
        tracing::info!(cancelled, scanned = expired.len(), "swept expired pending bookings");
    }

    Ok(cancelled)
}

/// Releases every seat hold past its TTL across all showtimes, independent
/// of whether its owning booking has been swept yet. `SeatStore::release`
/// inside `BookingEngine::cancel` already reclaims the seats belonging to a
/// cancelled booking, so in the steady state this job finds nothing — it
/// exists for the case where a hold's booking row was lost or never
/// created (e.g. a crash between `try_hold` and the booking insert).
pub async fn sweep_expired_holds(seat_store: &Arc<dyn cineslot_core::seat_store::SeatStore>) -> anyhow::Result<u64> {
    let count = seat_store.sweep_expired(None, Utc::now()).await?;
    if count > 0 {
        tracing::info!(released = count, "swept expired seat holds");
    }
    Ok(count)
}
