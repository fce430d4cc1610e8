//! Conversion implementations from DB models to API response types.
//!
//! These From implementations centralize the conversion logic that would
//! otherwise be duplicated across multiple route handlers.

use crate::models::{Booking, Payment, Showtime};
use cineslot_types::{
    api::{BookingResponse, PaymentResponse, ShowtimeResponse},
    enums::{BookingStatus, PaymentStatus},
};

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            showtime_id: b.showtime_id,
            booking_code: b.booking_code,
            seats: b.seats,
            total_price_minor: b.total_price_minor,
            status: b.status.parse().unwrap_or(BookingStatus::Pending),
            payment_status: None,
            hold_expires_at: b.hold_expires_at,
            cancelled_at: b.cancelled_at,
            created_at: b.created_at,
        }
    }
}

impl From<&Booking> for BookingResponse {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            showtime_id: b.showtime_id,
            booking_code: b.booking_code.clone(),
            seats: b.seats.clone(),
            total_price_minor: b.total_price_minor,
            status: b.status.parse().unwrap_or(BookingStatus::Pending),
            payment_status: None,
            hold_expires_at: b.hold_expires_at,
            cancelled_at: b.cancelled_at,
            created_at: b.created_at,
        }
    }
}

/// Attaches the latest payment status to an already-converted response.
/// Kept as an extension trait over a wider query join so the DTO
/// conversion itself stays a pure `From<Booking>`.
pub trait BookingResponseExt {
    fn with_payment_status(self, status: Option<PaymentStatus>) -> Self;
}

impl BookingResponseExt for BookingResponse {
    fn with_payment_status(mut self, status: Option<PaymentStatus>) -> Self {
        self.payment_status = status;
        self
    }
}

impl From<Showtime> for ShowtimeResponse {
    fn from(s: Showtime) -> Self {
        Self {
            id: s.id,
            movie_id: s.movie_id,
            theater_id: s.theater_id,
            starts_at: s.starts_at,
            price_minor: s.price_minor,
            capacity: s.capacity,
        }
    }
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            booking_id: p.booking_id,
            gateway: p.gateway,
            order_reference: p.order_reference,
            amount_minor: p.amount_minor,
            status: p.status.parse().unwrap_or(PaymentStatus::Pending),
            paid_at: p.paid_at,
        }
    }
}
