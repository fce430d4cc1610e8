use crate::models::Booking;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Inserts a new PENDING booking row under a caller-supplied id. The id is
/// generated before the seat hold is acquired (`BookingEngine::create`) so
/// the hold's `holder_booking_id` and the persisted booking's primary key
/// are the same value from the start — there's no window where the hold
/// exists under an id the booking row doesn't have yet. Seats are already
/// held by the caller (via `queries::seats::try_hold`) before this is
/// called — insertion never itself mutates seat state.
#[allow(clippy::too_many_arguments)]
pub async fn insert(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    showtime_id: Uuid,
    booking_code: &str,
    seats: &[String],
    total_price_minor: i32,
    hold_expires_at: DateTime<Utc>,
) -> sqlx::Result<Booking> {
    sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            id, user_id, showtime_id, booking_code, seats,
            total_price_minor, status, hold_expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(showtime_id)
    .bind(booking_code)
    .bind(seats)
    .bind(total_price_minor)
    .bind(hold_expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_code(pool: &PgPool, code: &str) -> sqlx::Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_code = $1")
        .bind(code)
        .fetch_optional(pool)
        .await
}

pub async fn code_exists(pool: &PgPool, code: &str) -> sqlx::Result<bool> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bookings WHERE booking_code = $1)")
            .bind(code)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// `status`, when given, must already be one of
/// `cineslot_types::validation::VALID_BOOKING_STATUSES` — the caller
/// validates it (`cineslot_types::validate_booking_status`) before this is
/// reached, the same way the teacher's admin listing validates
/// `payment_status` before querying (spec §6's `GET /bookings`).
pub async fn list_user_bookings_paginated(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<&str>,
    page: i32,
    per_page: i32,
) -> sqlx::Result<(Vec<Booking>, i64)> {
    let offset = (page - 1).max(0) * per_page;

    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        WHERE user_id = $1 AND ($4::text IS NULL OR status = $4)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(per_page)
    .bind(offset)
    .bind(status)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM bookings WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)",
    )
    .bind(user_id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok((bookings, total.0))
}

/// Every booking, newest first, for the admin listing (no user filter).
pub async fn list_all_bookings_paginated(
    pool: &PgPool,
    status: Option<&str>,
    page: i32,
    per_page: i32,
) -> sqlx::Result<(Vec<Booking>, i64)> {
    let offset = (page - 1).max(0) * per_page;

    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        WHERE ($3::text IS NULL OR status = $3)
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(per_page)
    .bind(offset)
    .bind(status)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM bookings WHERE ($1::text IS NULL OR status = $1)",
    )
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok((bookings, total.0))
}

/// Atomically transitions a booking from `from` to `to`, returning `None`
/// if the booking wasn't in `from` at the time of the update (someone else
/// already moved it, or it never existed). This is the sole write path for
/// booking status — BookingEngine validates the transition is legal via
/// `BookingStatus::can_transition_to` before calling this, and this call
/// makes the actual move atomic.
pub async fn transition_status(
    pool: &PgPool,
    id: Uuid,
    from: &str,
    to: &str,
) -> sqlx::Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = $3,
            cancelled_at = CASE WHEN $3 = 'cancelled' THEN NOW() ELSE cancelled_at END,
            updated_at = NOW()
        WHERE id = $1 AND status = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await
}

/// Extends a pending booking's hold deadline, used by BookingEngine.Extend.
pub async fn extend_hold(
    pool: &PgPool,
    id: Uuid,
    new_expires_at: DateTime<Utc>,
) -> sqlx::Result<Option<Booking>> {
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET hold_expires_at = $2, updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(new_expires_at)
    .fetch_optional(pool)
    .await
}

/// Batch of PENDING bookings whose hold has already expired, for the
/// sweeper. Bounded by `limit` so one tick can't try to process an
/// unbounded backlog.
pub async fn find_expired_pending(
    pool: &PgPool,
    before: DateTime<Utc>,
    limit: i64,
) -> sqlx::Result<Vec<Booking>> {
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        WHERE status = 'pending' AND hold_expires_at < $1
        ORDER BY hold_expires_at ASC
        LIMIT $2
        "#,
    )
    .bind(before)
    .bind(limit)
    .fetch_all(pool)
    .await
}
