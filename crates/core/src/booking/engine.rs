//! `BookingEngine` (spec §4.2): owns the booking lifecycle and its atomic
//! coupling to seat state. Transaction-then-lock-then-check-then-mutate
//! shape throughout, with the same "release on failure" discipline on
//! every path that can fail after a seat hold is taken.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cineslot_db::models::Booking;
use cineslot_types::{enums::BookingStatus, AppError, Result};
use uuid::Uuid;

use crate::booking_store::{BookingStore, InsertOutcome};
use crate::notify::Notifier;
use crate::seat_store::{HoldOutcome, SeatStore};

const MAX_CODE_COLLISION_RETRIES: u32 = 3;

pub struct BookingEngine {
    store: Arc<dyn BookingStore>,
    seat_store: Arc<dyn SeatStore>,
    notifier: Arc<dyn Notifier>,
    hold_ttl: Duration,
}

impl BookingEngine {
    pub fn new(
        store: Arc<dyn BookingStore>,
        seat_store: Arc<dyn SeatStore>,
        notifier: Arc<dyn Notifier>,
        hold_ttl: Duration,
    ) -> Self {
        Self {
            store,
            seat_store,
            notifier,
            hold_ttl,
        }
    }

    /// Creates a PENDING booking and atomically holds its seats (I4/I5).
    /// On any failure after a successful hold, the hold is released before
    /// the error is returned (spec §4.2, P3).
    pub async fn create(
        &self,
        user_id: Uuid,
        showtime_id: Uuid,
        seats: Vec<String>,
    ) -> Result<Booking> {
        if seats.is_empty() {
            return Err(AppError::Validation("seats must not be empty".to_string()));
        }
        let mut deduped = seats.clone();
        deduped.sort();
        deduped.dedup();
        if deduped.len() != seats.len() {
            return Err(AppError::Validation("duplicate seats requested".to_string()));
        }

        let showtime = self.store.showtime(showtime_id).await?;

        if seats.len() as i32 > showtime.capacity {
            return Err(AppError::Validation(
                "requested seats exceed showtime capacity".to_string(),
            ));
        }

        // I4/P7: price is frozen against the showtime's price as read right
        // now, and never recomputed even if the showtime's price changes
        // later.
        let total_price_minor = showtime.price_minor * seats.len() as i32;

        let booking_id_for_hold = Uuid::new_v4();

        let hold_outcome = self
            .seat_store
            .try_hold(
                showtime_id,
                &seats,
                booking_id_for_hold,
                user_id,
                self.hold_ttl,
            )
            .await?;

        let conflicting = match hold_outcome {
            HoldOutcome::Held => None,
            HoldOutcome::Conflict(seats) => Some(seats),
        };
        if let Some(conflicting) = conflicting {
            return Err(AppError::Conflict(format!(
                "seats unavailable: {}",
                conflicting.join(", ")
            )));
        }

        let hold_expires_at = Utc::now()
            + chrono::Duration::from_std(self.hold_ttl).unwrap_or_default();

        for attempt in 0..=MAX_CODE_COLLISION_RETRIES {
            let booking_code = super::utils::generate_booking_code();

            match self
                .store
                .insert(
                    booking_id_for_hold,
                    user_id,
                    showtime_id,
                    &booking_code,
                    &seats,
                    total_price_minor,
                    hold_expires_at,
                )
                .await
            {
                Ok(InsertOutcome::Created(booking)) => return Ok(booking),
                Ok(InsertOutcome::CodeCollision) if attempt < MAX_CODE_COLLISION_RETRIES => {
                    continue;
                }
                Ok(InsertOutcome::CodeCollision) => break,
                Err(e) => {
                    // Persistence failed after a successful hold: release
                    // it before surfacing the error (spec §4.2).
                    let _ = self
                        .seat_store
                        .release(showtime_id, &seats, booking_id_for_hold)
                        .await;
                    return Err(e);
                }
            }
        }

        let _ = self
            .seat_store
            .release(showtime_id, &seats, booking_id_for_hold)
            .await;
        Err(AppError::Conflict(format!(
            "could not allocate a unique booking code after {MAX_CODE_COLLISION_RETRIES} retries"
        )))
    }

    /// Promotes a PENDING booking to CONFIRMED. Idempotent: calling this on
    /// an already-CONFIRMED booking is a no-op that returns the existing
    /// row. Calling it on a CANCELLED booking is `invalid-transition` — the
    /// seats may already have been re-sold.
    pub async fn confirm(&self, booking_id: Uuid) -> Result<Booking> {
        let booking = self.require_booking(booking_id).await?;
        let current = booking.status.parse::<BookingStatus>().unwrap_or_default();

        if current == BookingStatus::Confirmed {
            return Ok(booking);
        }
        if !current.can_transition_to(BookingStatus::Confirmed) {
            return Err(AppError::InvalidTransition(format!(
                "cannot confirm a booking in status {}",
                current.as_str()
            )));
        }

        let updated = self
            .store
            .transition_status(booking_id, "pending", "confirmed")
            .await?;

        let booking = match updated {
            Some(b) => b,
            // Someone else already moved it between our read and the CAS —
            // reload and treat CONFIRMED as the idempotent success case.
            None => {
                let current = self.require_booking(booking_id).await?;
                if current.status == "confirmed" {
                    return Ok(current);
                }
                return Err(AppError::InvalidTransition(format!(
                    "booking {booking_id} is no longer pending"
                )));
            }
        };

        self.seat_store
            .promote(booking.showtime_id, &booking.seats, booking.id)
            .await?;

        // Out-of-band confirmation artifacts: failures here are logged,
        // never propagated — confirmation must not be reversed by a
        // downstream notification error (spec §4.2).
        self.notifier.send_booking_confirmation(&booking).await;

        Ok(booking)
    }

    /// Cancels a booking. Permitted from PENDING (abandonment) and,
    /// administratively, from CONFIRMED (refund — reverses the promotion).
    /// Idempotent from CANCELLED. Tolerates a showtime that's been deleted
    /// out of band: logs a warning and still transitions the booking.
    pub async fn cancel(&self, booking_id: Uuid) -> Result<Booking> {
        let booking = self.require_booking(booking_id).await?;
        let current = booking.status.parse::<BookingStatus>().unwrap_or_default();

        if current == BookingStatus::Cancelled {
            return Ok(booking);
        }
        if !current.can_transition_to(BookingStatus::Cancelled) {
            return Err(AppError::InvalidTransition(format!(
                "cannot cancel a booking in status {}",
                current.as_str()
            )));
        }
        let from_status = current.as_str();

        if let Err(e) = self
            .seat_store
            .release(booking.showtime_id, &booking.seats, booking.id)
            .await
        {
            tracing::warn!(
                booking_id = %booking.id,
                showtime_id = %booking.showtime_id,
                error = %e,
                "seat release failed while cancelling booking — showtime may have been deleted out of band"
            );
        }

        let updated = self
            .store
            .transition_status(booking_id, from_status, "cancelled")
            .await?;

        match updated {
            Some(b) => Ok(b),
            None => self.require_booking(booking_id).await,
        }
    }

    /// Re-sets the caller's seat holds to `now + holdWindow`. Only the
    /// owning user may extend, and only while PENDING.
    pub async fn extend(&self, booking_id: Uuid, user_id: Uuid) -> Result<()> {
        let booking = self.require_booking(booking_id).await?;

        if booking.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        let current = booking.status.parse::<BookingStatus>().unwrap_or_default();
        if current.is_terminal() {
            return Err(AppError::InvalidTransition(
                "can only extend a pending booking".to_string(),
            ));
        }

        self.seat_store
            .extend(booking.showtime_id, &booking.seats, booking.id, self.hold_ttl)
            .await?;

        let new_expires_at =
            Utc::now() + chrono::Duration::from_std(self.hold_ttl).unwrap_or_default();
        self.store.extend_hold(booking_id, new_expires_at).await?;

        Ok(())
    }

    /// Reads a booking without mutating it — used by collaborators
    /// (`PaymentCoordinator`) that need the current row, e.g. to price a
    /// payment intent or check whether a callback's booking is still
    /// PENDING, without owning a copy of the lifecycle transitions
    /// themselves.
    pub async fn get(&self, booking_id: Uuid) -> Result<Booking> {
        self.require_booking(booking_id).await
    }

    async fn require_booking(&self, booking_id: Uuid) -> Result<Booking> {
        self.store
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))
    }
}
