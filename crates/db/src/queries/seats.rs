//! SQL-level primitives backing ShowtimeSeatStore. Each public function is
//! the single transaction expressing the conditional predicate described by
//! its operation — no optimistic retry, one `SELECT ... FOR UPDATE` pass and
//! a guarded write. Overselling is prevented here, not in `cineslot-core`.

use crate::models::ShowtimeSeat;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn snapshot(pool: &PgPool, showtime_id: Uuid) -> sqlx::Result<Vec<ShowtimeSeat>> {
    sqlx::query_as::<_, ShowtimeSeat>(
        "SELECT * FROM showtime_seats WHERE showtime_id = $1 ORDER BY seat_label ASC",
    )
    .bind(showtime_id)
    .fetch_all(pool)
    .await
}

/// Outcome of a `try_hold` call. `Conflict` names every requested seat that
/// was already booked, live-held by someone else, or simply doesn't exist
/// for this showtime — enough for the caller to render a precise "seat X is
/// no longer available" message instead of a blanket failure.
pub enum TryHoldOutcome {
    Held,
    Conflict(Vec<String>),
}

/// Attempts to move every seat in `seat_labels` from free (or expired-held)
/// to held by `booking_id`. All-or-nothing: on any conflict the transaction
/// is rolled back and nothing is mutated.
pub async fn try_hold(
    pool: &PgPool,
    showtime_id: Uuid,
    seat_labels: &[String],
    booking_id: Uuid,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> sqlx::Result<TryHoldOutcome> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query_as::<_, ShowtimeSeat>(
        r#"
        SELECT * FROM showtime_seats
        WHERE showtime_id = $1 AND seat_label = ANY($2)
        FOR UPDATE
        "#,
    )
    .bind(showtime_id)
    .bind(seat_labels)
    .fetch_all(&mut *tx)
    .await?;

    let now = Utc::now();
    let found: std::collections::HashSet<&str> =
        rows.iter().map(|s| s.seat_label.as_str()).collect();
    let mut conflicts: Vec<String> = seat_labels
        .iter()
        .filter(|label| !found.contains(label.as_str()))
        .cloned()
        .collect();
    conflicts.extend(rows.iter().filter_map(|seat| {
        let blocked = seat.status == "booked"
            || (seat.status == "held" && seat.expires_at.map_or(true, |exp| exp > now));
        blocked.then(|| seat.seat_label.clone())
    }));

    if !conflicts.is_empty() {
        tx.rollback().await?;
        return Ok(TryHoldOutcome::Conflict(conflicts));
    }

    sqlx::query(
        r#"
        UPDATE showtime_seats
        SET status = 'held', holder_booking_id = $3, holder_user_id = $4, expires_at = $5
        WHERE showtime_id = $1 AND seat_label = ANY($2)
        "#,
    )
    .bind(showtime_id)
    .bind(seat_labels)
    .bind(booking_id)
    .bind(user_id)
    .bind(expires_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(TryHoldOutcome::Held)
}

/// Moves held seats to booked. Only rows currently held by `booking_id`
/// are affected; a seat that's already booked (e.g. a re-promote after a
/// retried confirm) matches zero rows and is left untouched, which is what
/// makes this idempotent.
pub async fn promote(
    pool: &PgPool,
    showtime_id: Uuid,
    seat_labels: &[String],
    booking_id: Uuid,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE showtime_seats
        SET status = 'booked', holder_user_id = NULL, expires_at = NULL
        WHERE showtime_id = $1 AND seat_label = ANY($2)
          AND status = 'held' AND holder_booking_id = $3
        "#,
    )
    .bind(showtime_id)
    .bind(seat_labels)
    .bind(booking_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Releases seats held or booked by `booking_id` back to free. Idempotent —
/// calling it twice for the same booking is a no-op the second time.
pub async fn release(
    pool: &PgPool,
    showtime_id: Uuid,
    seat_labels: &[String],
    booking_id: Uuid,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE showtime_seats
        SET status = 'free', holder_booking_id = NULL, holder_user_id = NULL, expires_at = NULL
        WHERE showtime_id = $1 AND seat_label = ANY($2)
          AND holder_booking_id = $3
        "#,
    )
    .bind(showtime_id)
    .bind(seat_labels)
    .bind(booking_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Re-sets `expires_at` on seats still held by `booking_id`
/// (`BookingEngine::extend`). Seats not held by this booking are left
/// untouched.
pub async fn extend_hold(
    pool: &PgPool,
    showtime_id: Uuid,
    seat_labels: &[String],
    booking_id: Uuid,
    new_expires_at: DateTime<Utc>,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE showtime_seats
        SET expires_at = $4
        WHERE showtime_id = $1 AND seat_label = ANY($2)
          AND status = 'held' AND holder_booking_id = $3
        "#,
    )
    .bind(showtime_id)
    .bind(seat_labels)
    .bind(booking_id)
    .bind(new_expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Sweeps seats whose hold has expired back to free, scoped to a single
/// showtime when given one, or across every showtime otherwise. Returns the
/// number of seats reclaimed.
pub async fn sweep_expired_holds(
    pool: &PgPool,
    showtime_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> sqlx::Result<u64> {
    let result = match showtime_id {
        Some(showtime_id) => {
            sqlx::query(
                r#"
                UPDATE showtime_seats
                SET status = 'free', holder_booking_id = NULL, holder_user_id = NULL, expires_at = NULL
                WHERE showtime_id = $1 AND status = 'held' AND expires_at < $2
                "#,
            )
            .bind(showtime_id)
            .bind(now)
            .execute(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                UPDATE showtime_seats
                SET status = 'free', holder_booking_id = NULL, holder_user_id = NULL, expires_at = NULL
                WHERE status = 'held' AND expires_at < $1
                "#,
            )
            .bind(now)
            .execute(pool)
            .await?
        }
    };

    Ok(result.rows_affected())
}
