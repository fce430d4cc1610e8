//! In-process `SeatStore` double used by the property tests (P1-P8) that
//! exercise the seat-hold protocol itself rather than Postgres. Guarded by
//! a single `tokio::sync::Mutex` — acceptable here because it's test-only;
//! the production `PgSeatStore` never holds a process-local lock across a
//! request (spec §5).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cineslot_types::{AppError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{HeldSeat, HoldOutcome, SeatSnapshot, SeatStore};

#[derive(Debug, Clone)]
struct HoldRecord {
    holder_booking_id: Uuid,
    holder_user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ShowtimeState {
    capacity: i32,
    // Seat label -> the booking that owns it, matching the production
    // schema where a booked row keeps its `holder_booking_id` (see
    // `queries::seats::promote`) instead of clearing it on promotion.
    booked: HashMap<String, Uuid>,
    held: HashMap<String, HoldRecord>,
}

#[derive(Clone, Default)]
pub struct InMemorySeatStore {
    showtimes: Arc<Mutex<HashMap<Uuid, ShowtimeState>>>,
}

impl InMemorySeatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a showtime with the given seat capacity. Test fixtures
    /// call this before exercising `try_hold`/`snapshot` against it — there
    /// is no live `showtimes` table behind this store.
    pub async fn register_showtime(&self, showtime_id: Uuid, capacity: i32) {
        let mut guard = self.showtimes.lock().await;
        guard.entry(showtime_id).or_insert_with(|| ShowtimeState {
            capacity,
            booked: HashMap::new(),
            held: HashMap::new(),
        });
    }

    fn purge_expired(state: &mut ShowtimeState, now: DateTime<Utc>) -> u64 {
        let expired: Vec<String> = state
            .held
            .iter()
            .filter(|(_, rec)| rec.expires_at <= now)
            .map(|(seat, _)| seat.clone())
            .collect();
        for seat in &expired {
            state.held.remove(seat);
        }
        expired.len() as u64
    }
}

#[async_trait]
impl SeatStore for InMemorySeatStore {
    async fn try_hold(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        holder_booking_id: Uuid,
        holder_user_id: Uuid,
        ttl: Duration,
    ) -> Result<HoldOutcome> {
        let mut guard = self.showtimes.lock().await;
        let state = guard
            .get_mut(&showtime_id)
            .ok_or_else(|| AppError::NotFound(format!("showtime {showtime_id}")))?;

        let now = Utc::now();
        Self::purge_expired(state, now);

        let mut seen = HashSet::new();
        let mut conflicts = Vec::new();
        for seat in seats {
            if !seen.insert(seat.clone()) {
                continue;
            }
            if state.booked.contains_key(seat) || state.held.contains_key(seat) {
                conflicts.push(seat.clone());
            }
        }

        if !conflicts.is_empty() {
            return Ok(HoldOutcome::Conflict(conflicts));
        }

        let expires_at = now + chrono::Duration::from_std(ttl).unwrap_or_default();
        for seat in seats {
            state.held.insert(
                seat.clone(),
                HoldRecord {
                    holder_booking_id,
                    holder_user_id,
                    expires_at,
                },
            );
        }

        Ok(HoldOutcome::Held)
    }

    async fn promote(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        holder_booking_id: Uuid,
    ) -> Result<()> {
        let mut guard = self.showtimes.lock().await;
        let state = guard
            .get_mut(&showtime_id)
            .ok_or_else(|| AppError::NotFound(format!("showtime {showtime_id}")))?;

        for seat in seats {
            let owned = state
                .held
                .get(seat)
                .map(|rec| rec.holder_booking_id == holder_booking_id)
                .unwrap_or(false);
            if owned {
                state.held.remove(seat);
                state.booked.insert(seat.clone(), holder_booking_id);
            }
        }

        Ok(())
    }

    async fn release(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        holder_booking_id: Uuid,
    ) -> Result<()> {
        let mut guard = self.showtimes.lock().await;
        let state = guard
            .get_mut(&showtime_id)
            .ok_or_else(|| AppError::NotFound(format!("showtime {showtime_id}")))?;

        for seat in seats {
            if let Some(rec) = state.held.get(seat) {
                if rec.holder_booking_id == holder_booking_id {
                    state.held.remove(seat);
                }
            }
            // Refund path: a booked seat keeps its owning booking id (see
            // `promote` above), so only the booking that owns it can
            // release it back to free — matching `queries::seats::release`'s
            // `WHERE holder_booking_id = $3` guard.
            if state.booked.get(seat) == Some(&holder_booking_id) {
                state.booked.remove(seat);
            }
        }

        Ok(())
    }

    async fn sweep_expired(&self, showtime_id: Option<Uuid>, now: DateTime<Utc>) -> Result<u64> {
        let mut guard = self.showtimes.lock().await;
        let mut total = 0u64;

        match showtime_id {
            Some(id) => {
                if let Some(state) = guard.get_mut(&id) {
                    total += Self::purge_expired(state, now);
                }
            }
            None => {
                for state in guard.values_mut() {
                    total += Self::purge_expired(state, now);
                }
            }
        }

        Ok(total)
    }

    async fn extend(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        holder_booking_id: Uuid,
        ttl: Duration,
    ) -> Result<()> {
        let mut guard = self.showtimes.lock().await;
        let state = guard
            .get_mut(&showtime_id)
            .ok_or_else(|| AppError::NotFound(format!("showtime {showtime_id}")))?;

        let new_expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default();
        for seat in seats {
            if let Some(rec) = state.held.get_mut(seat) {
                if rec.holder_booking_id == holder_booking_id {
                    rec.expires_at = new_expires_at;
                }
            }
        }

        Ok(())
    }

    async fn snapshot(&self, showtime_id: Uuid) -> Result<SeatSnapshot> {
        let mut guard = self.showtimes.lock().await;
        let state = guard
            .get_mut(&showtime_id)
            .ok_or_else(|| AppError::NotFound(format!("showtime {showtime_id}")))?;

        Self::purge_expired(state, Utc::now());

        let booked: Vec<String> = state.booked.keys().cloned().collect();
        let held: Vec<HeldSeat> = state
            .held
            .iter()
            .map(|(seat, rec)| HeldSeat {
                seat_label: seat.clone(),
                holder_booking_id: rec.holder_booking_id,
                holder_user_id: rec.holder_user_id,
                expires_at: rec.expires_at,
            })
            .collect();

        let available_count = state.capacity as i64 - booked.len() as i64 - held.len() as i64;

        Ok(SeatSnapshot {
            showtime_id,
            capacity: state.capacity,
            booked,
            held,
            available_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_try_hold_then_conflict() {
        let store = InMemorySeatStore::new();
        let showtime_id = Uuid::new_v4();
        store.register_showtime(showtime_id, 1).await;

        let booking_a = Uuid::new_v4();
        let user_a = Uuid::new_v4();
        let outcome = store
            .try_hold(
                showtime_id,
                &["A1".to_string()],
                booking_a,
                user_a,
                Duration::from_secs(600),
            )
            .await
            .unwrap();
        assert_eq!(outcome, HoldOutcome::Held);

        let booking_b = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let outcome = store
            .try_hold(
                showtime_id,
                &["A1".to_string()],
                booking_b,
                user_b,
                Duration::from_secs(600),
            )
            .await
            .unwrap();
        assert_eq!(outcome, HoldOutcome::Conflict(vec!["A1".to_string()]));
    }

    #[tokio::test]
    async fn test_hold_all_or_nothing() {
        let store = InMemorySeatStore::new();
        let showtime_id = Uuid::new_v4();
        store.register_showtime(showtime_id, 2).await;

        let first = Uuid::new_v4();
        store
            .try_hold(
                showtime_id,
                &["A2".to_string()],
                first,
                Uuid::new_v4(),
                Duration::from_secs(600),
            )
            .await
            .unwrap();

        // A1 is free but A2 is taken: the whole request must fail, and A1
        // must remain untouched.
        let second = Uuid::new_v4();
        let outcome = store
            .try_hold(
                showtime_id,
                &["A1".to_string(), "A2".to_string()],
                second,
                Uuid::new_v4(),
                Duration::from_secs(600),
            )
            .await
            .unwrap();
        assert_eq!(outcome, HoldOutcome::Conflict(vec!["A2".to_string()]));

        let snapshot = store.snapshot(showtime_id).await.unwrap();
        assert!(snapshot.held.iter().all(|h| h.seat_label != "A1"));
    }

    #[tokio::test]
    async fn test_sweep_expired_frees_seat() {
        let store = InMemorySeatStore::new();
        let showtime_id = Uuid::new_v4();
        store.register_showtime(showtime_id, 1).await;

        store
            .try_hold(
                showtime_id,
                &["A1".to_string()],
                Uuid::new_v4(),
                Uuid::new_v4(),
                Duration::from_millis(1),
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;

        let reclaimed = store
            .sweep_expired(Some(showtime_id), Utc::now())
            .await
            .unwrap();
        assert_eq!(reclaimed, 1);

        let snapshot = store.snapshot(showtime_id).await.unwrap();
        assert_eq!(snapshot.available_count, 1);
    }
}
