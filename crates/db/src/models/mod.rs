pub mod booking;
pub mod payment;
pub mod seat;
pub mod showtime;
pub mod user;

pub use booking::Booking;
pub use payment::Payment;
pub use seat::ShowtimeSeat;
pub use showtime::Showtime;
pub use user::User;
