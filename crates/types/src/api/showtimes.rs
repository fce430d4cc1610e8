use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::enums::SeatStatus;

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct ShowtimeResponse {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub theater_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub price_minor: i32,
    pub capacity: i32,
}

/// State of a single seat as of the moment it was read. `held_by_me`
/// distinguishes "held by someone else" from "held by the caller's own
/// in-flight booking" so a client can tell a held seat apart from one it is
/// itself about to confirm.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct SeatResponse {
    pub seat_label: String,
    pub status: SeatStatus,
    #[ts(optional)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Full seat snapshot for a showtime, per ShowtimeSeatStore.Snapshot. Only
/// non-free seats are listed individually — a seat absent from `seats` is
/// free; `available_count` is authoritative for "how many can I still
/// pick" without the client needing the full seat-label universe.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct SeatsSnapshotResponse {
    pub showtime_id: Uuid,
    pub capacity: i32,
    pub available_count: i64,
    pub seats: Vec<SeatResponse>,
}
