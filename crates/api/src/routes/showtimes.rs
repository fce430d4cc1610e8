//! `GET /showtimes/{id}/seats` (spec §6): unauthenticated seat-availability
//! snapshot, backed directly by `ShowtimeSeatStore::snapshot` — the same
//! expiry-purging read every other component uses, so a browsing client
//! never sees a seat held past its TTL.

use axum::extract::{OriginalUri, Path, State};
use axum::Json;
use cineslot_types::api::{SeatResponse, SeatsSnapshotResponse};
use cineslot_types::enums::SeatStatus;
use uuid::Uuid;

use crate::middleware::AppState;
use crate::response::ApiError;

pub async fn get_seats(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(showtime_id): Path<Uuid>,
) -> Result<Json<SeatsSnapshotResponse>, ApiError> {
    let snapshot = state
        .seat_store
        .snapshot(showtime_id)
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;
    let capacity = snapshot.capacity;
    let available_count = snapshot.available_count;

    let mut seats: Vec<SeatResponse> = snapshot
        .booked
        .into_iter()
        .map(|seat_label| SeatResponse {
            seat_label,
            status: SeatStatus::Booked,
            expires_at: None,
        })
        .collect();

    seats.extend(snapshot.held.into_iter().map(|h| SeatResponse {
        seat_label: h.seat_label,
        status: SeatStatus::Held,
        expires_at: Some(h.expires_at),
    }));

    seats.sort_by(|a, b| a.seat_label.cmp(&b.seat_label));

    Ok(Json(SeatsSnapshotResponse {
        showtime_id,
        capacity,
        available_count,
        seats,
    }))
}
