//! Out-of-band confirmation artifacts: receipt email and QR ticket, sent
//! after a booking is confirmed. Spec §4.2: "failures here are logged, not
//! propagated — confirmation must not be reversed by a downstream
//! notification error." Kept as a thin trait so `BookingEngine` doesn't
//! depend on a concrete mailer.

use async_trait::async_trait;
use cineslot_db::models::Booking;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_booking_confirmation(&self, booking: &Booking);
}

/// Default notifier: logs at info level instead of dispatching SMTP. The
/// spec treats email delivery content as out of scope (§1); this exists so
/// `BookingEngine::confirm` always has something to call.
#[derive(Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send_booking_confirmation(&self, booking: &Booking) {
        tracing::info!(
            booking_id = %booking.id,
            booking_code = %booking.booking_code,
            "booking confirmed — dispatching receipt + QR ticket"
        );
    }
}
