pub mod sweep;

pub use sweep::{sweep_expired_bookings, sweep_expired_holds};
