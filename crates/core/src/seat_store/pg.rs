use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cineslot_db::queries::{seats, seats::TryHoldOutcome, showtimes};
use cineslot_db::PgPool;
use cineslot_types::{AppError, Result};
use std::time::Duration;
use uuid::Uuid;

use super::{HeldSeat, HoldOutcome, SeatSnapshot, SeatStore};
use crate::events::EventBus;

/// Production `SeatStore`: each primitive is one SQL statement (or a
/// transaction of a few) expressing the conditional predicate "no
/// requested seat is booked or live-held", using `SELECT ... FOR UPDATE`
/// row locks to prevent overselling rather than optimistic retry.
pub struct PgSeatStore {
    pool: PgPool,
    events: EventBus,
}

impl PgSeatStore {
    pub fn new(pool: PgPool, events: EventBus) -> Self {
        Self { pool, events }
    }
}

#[async_trait]
impl SeatStore for PgSeatStore {
    async fn try_hold(
        &self,
        showtime_id: Uuid,
        seat_labels: &[String],
        holder_booking_id: Uuid,
        holder_user_id: Uuid,
        ttl: Duration,
    ) -> Result<HoldOutcome> {
        let expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default();

        let outcome = seats::try_hold(
            &self.pool,
            showtime_id,
            seat_labels,
            holder_booking_id,
            holder_user_id,
            expires_at,
        )
        .await
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

        match outcome {
            TryHoldOutcome::Held => {
                self.events.publish(showtime_id);
                Ok(HoldOutcome::Held)
            }
            TryHoldOutcome::Conflict(seats) => Ok(HoldOutcome::Conflict(seats)),
        }
    }

    async fn promote(
        &self,
        showtime_id: Uuid,
        seat_labels: &[String],
        holder_booking_id: Uuid,
    ) -> Result<()> {
        seats::promote(&self.pool, showtime_id, seat_labels, holder_booking_id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        self.events.publish(showtime_id);
        Ok(())
    }

    async fn release(
        &self,
        showtime_id: Uuid,
        seat_labels: &[String],
        holder_booking_id: Uuid,
    ) -> Result<()> {
        seats::release(&self.pool, showtime_id, seat_labels, holder_booking_id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        self.events.publish(showtime_id);
        Ok(())
    }

    async fn sweep_expired(&self, showtime_id: Option<Uuid>, now: DateTime<Utc>) -> Result<u64> {
        let count = seats::sweep_expired_holds(&self.pool, showtime_id, now)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        if count > 0 {
            if let Some(id) = showtime_id {
                self.events.publish(id);
            }
        }
        Ok(count)
    }

    async fn extend(
        &self,
        showtime_id: Uuid,
        seat_labels: &[String],
        holder_booking_id: Uuid,
        ttl: Duration,
    ) -> Result<()> {
        let new_expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default();
        seats::extend_hold(
            &self.pool,
            showtime_id,
            seat_labels,
            holder_booking_id,
            new_expires_at,
        )
        .await
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn snapshot(&self, showtime_id: Uuid) -> Result<SeatSnapshot> {
        // Purge expired holds inline before reading (spec §4.1) so the
        // caller never observes a stale hold.
        seats::sweep_expired_holds(&self.pool, Some(showtime_id), Utc::now())
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

        let showtime = showtimes::find_by_id(&self.pool, showtime_id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("showtime {showtime_id}")))?;

        let rows = seats::snapshot(&self.pool, showtime_id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

        let mut booked = Vec::new();
        let mut held = Vec::new();
        for row in rows {
            match row.status.as_str() {
                "booked" => booked.push(row.seat_label),
                "held" => {
                    if let (Some(holder_booking_id), Some(holder_user_id), Some(expires_at)) =
                        (row.holder_booking_id, row.holder_user_id, row.expires_at)
                    {
                        held.push(HeldSeat {
                            seat_label: row.seat_label,
                            holder_booking_id,
                            holder_user_id,
                            expires_at,
                        });
                    }
                }
                _ => {}
            }
        }

        let available_count = showtime.capacity as i64 - booked.len() as i64 - held.len() as i64;

        Ok(SeatSnapshot {
            showtime_id,
            capacity: showtime.capacity,
            booked,
            held,
            available_count,
        })
    }
}
