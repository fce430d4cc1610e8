use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per seat per showtime. The row's `status` column *is* the seat's
/// state — there is no separate hold table, so a seat can never be both
/// free and held at once (structural, not enforced in application code).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShowtimeSeat {
    pub showtime_id: Uuid,
    pub seat_label: String,
    pub status: String,
    pub holder_booking_id: Option<Uuid>,
    pub holder_user_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}
