//! Booking endpoints (spec §6): create, list, fetch, lookup-by-code,
//! cancel, and the staff-only QR gate check. Each handler is a thin
//! adapter over `BookingEngine` — validation and the lifecycle rules
//! themselves live in `cineslot-core`, not here.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::Json;
use cineslot_core::qr::QrPayload;
use cineslot_db::conversions::BookingResponseExt;
use cineslot_db::queries::{bookings as booking_queries, payments as payment_queries};
use cineslot_types::api::{
    BookingResponse, CreateBookingRequest, PageInfo, UserBookingsResponse, VerifyQrRequest,
    VerifyQrResponse,
};
use cineslot_types::{enums::PaymentStatus, validate_booking_status, AppError};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{AppState, AuthUser, StaffUser};
use crate::response::ApiError;

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    #[serde(default = "default_page")]
    pub page: i32,
    #[serde(default = "default_per_page")]
    pub per_page: i32,
    /// Optional `status` filter (`pending`/`confirmed`/`cancelled`),
    /// validated against `cineslot_types::validate_booking_status` before
    /// it ever reaches a query.
    pub status: Option<String>,
}

fn default_page() -> i32 {
    1
}

fn default_per_page() -> i32 {
    20
}

async fn latest_payment_status(
    state: &AppState,
    booking_id: Uuid,
) -> Result<Option<PaymentStatus>, AppError> {
    let payment = payment_queries::find_by_booking_id(&state.db, booking_id)
        .await
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
    Ok(payment.and_then(|p| p.status.parse().ok()))
}

/// `POST /bookings`: create a PENDING booking, atomically holding its
/// seats.
pub async fn create_booking(
    user: AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state
        .booking_engine
        .create(user.id, payload.showtime_id, payload.seats)
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;

    Ok(Json(BookingResponse::from(&booking)))
}

/// `GET /bookings`: the caller's own bookings, paginated; an admin caller
/// sees every booking instead (spec §6).
pub async fn list_bookings(
    user: AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<UserBookingsResponse>, ApiError> {
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, 100);

    if let Some(ref status) = query.status {
        validate_booking_status(status)
            .map_err(|e| ApiError::at(uri.path(), AppError::Validation(e)))?;
    }
    let status = query.status.as_deref();

    let (rows, total) = if user.is_admin() {
        booking_queries::list_all_bookings_paginated(&state.db, status, page, per_page)
            .await
            .map_err(|e| ApiError::at(uri.path(), AppError::StorageUnavailable(e.to_string())))?
    } else {
        booking_queries::list_user_bookings_paginated(&state.db, user.id, status, page, per_page)
            .await
            .map_err(|e| ApiError::at(uri.path(), AppError::StorageUnavailable(e.to_string())))?
    };

    let mut data = Vec::with_capacity(rows.len());
    for booking in rows {
        let payment_status = latest_payment_status(&state, booking.id)
            .await
            .map_err(|e| ApiError::at(uri.path(), e))?;
        data.push(BookingResponse::from(&booking).with_payment_status(payment_status));
    }

    let total_pages = ((total as f64) / (per_page as f64)).ceil().max(1.0) as i32;

    Ok(Json(UserBookingsResponse {
        data,
        page_info: PageInfo {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /bookings/{id}`: fetch a single booking. Callers may only fetch
/// their own; an admin may fetch any.
pub async fn get_booking(
    user: AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state
        .booking_engine
        .get(id)
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;

    if booking.user_id != user.id && !user.is_admin() {
        return Err(ApiError::at(uri.path(), AppError::Forbidden));
    }

    let payment_status = latest_payment_status(&state, booking.id)
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;

    Ok(Json(
        BookingResponse::from(&booking).with_payment_status(payment_status),
    ))
}

/// `GET /bookings/code/{code}`: lookup by the human-shareable booking
/// code.
pub async fn get_booking_by_code(
    user: AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = booking_queries::find_by_code(&state.db, &code)
        .await
        .map_err(|e| ApiError::at(uri.path(), AppError::StorageUnavailable(e.to_string())))?
        .ok_or_else(|| ApiError::at(uri.path(), AppError::NotFound(format!("booking code {code}"))))?;

    if booking.user_id != user.id && !user.is_admin() {
        return Err(ApiError::at(uri.path(), AppError::Forbidden));
    }

    let payment_status = latest_payment_status(&state, booking.id)
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;

    Ok(Json(
        BookingResponse::from(&booking).with_payment_status(payment_status),
    ))
}

/// `PATCH /bookings/{id}/cancel`: cancel while PENDING (pre-payment
/// abandonment). `BookingEngine::cancel` also permits the refund path from
/// CONFIRMED, but that is only reachable via `PaymentCoordinator::refund`
/// — this endpoint only allows the owner to back out before paying.
pub async fn cancel_booking(
    user: AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state
        .booking_engine
        .get(id)
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;

    if booking.user_id != user.id {
        return Err(ApiError::at(uri.path(), AppError::Forbidden));
    }
    if booking.status != "pending" {
        return Err(ApiError::at(
            uri.path(),
            AppError::InvalidTransition("booking is not pending".to_string()),
        ));
    }

    let cancelled = state
        .booking_engine
        .cancel(id)
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;

    Ok(Json(BookingResponse::from(&cancelled)))
}

/// `POST /bookings/verify-qr`: staff-only gate check. Decodes the payload,
/// checks its 30-day freshness window, and cross-references the current
/// booking row (the QR blob is not itself proof of payment — the booking's
/// live status is).
pub async fn verify_qr(
    StaffUser(_staff): StaffUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(payload): Json<VerifyQrRequest>,
) -> Result<Json<VerifyQrResponse>, ApiError> {
    let qr = QrPayload::decode(&payload.payload).map_err(|e| ApiError::at(uri.path(), e))?;

    let booking = state
        .booking_engine
        .get(qr.booking_id)
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;

    let status = booking.status.parse().unwrap_or_default();
    let valid = !qr.is_expired_at(chrono::Utc::now())
        && booking.booking_code == qr.booking_code
        && matches!(status, cineslot_types::enums::BookingStatus::Confirmed);

    Ok(Json(VerifyQrResponse {
        booking_id: booking.id,
        booking_code: booking.booking_code,
        status,
        valid,
    }))
}
