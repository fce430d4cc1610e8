pub mod booking;
pub mod booking_store;
pub mod config;
pub mod events;
pub mod notify;
pub mod qr;
pub mod seat_store;

pub use booking::BookingEngine;
pub use booking_store::{BookingStore, InMemoryBookingStore, PgBookingStore};
pub use config::Config;
pub use events::EventBus;
pub use seat_store::{InMemorySeatStore, PgSeatStore, SeatStore};
