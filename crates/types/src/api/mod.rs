pub mod auth;
pub mod bookings;
pub mod payments;
pub mod showtimes;

pub use auth::*;
pub use bookings::*;
pub use payments::*;
pub use showtimes::*;
