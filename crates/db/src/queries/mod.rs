pub mod bookings;
pub mod payments;
pub mod seats;
pub mod showtimes;
pub mod users;
