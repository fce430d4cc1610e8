use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::enums::{BookingStatus, PaymentStatus};

/// Page information for paginated responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct PageInfo {
    pub page: i32,
    pub per_page: i32,
    pub total: i64,
    pub total_pages: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub showtime_id: Uuid,
    pub booking_code: String,
    pub seats: Vec<String>,
    /// Total price frozen at creation time (I4/I7) — never recomputed.
    pub total_price_minor: i32,
    pub status: BookingStatus,
    pub payment_status: Option<PaymentStatus>,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub showtime_id: Uuid,
    #[validate(length(min = 1, max = 10))]
    pub seats: Vec<String>,
    pub payment_method: String,
}

/// Paginated response for a user's bookings.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct UserBookingsResponse {
    pub data: Vec<BookingResponse>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyQrRequest {
    pub payload: String,
}

#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct VerifyQrResponse {
    pub booking_id: Uuid,
    pub booking_code: String,
    pub status: BookingStatus,
    pub valid: bool,
}
