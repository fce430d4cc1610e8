pub mod bookings;
pub mod payments;
pub mod showtimes;
