//! `PaymentCoordinator` (spec §4.3): the exactly-once bridge between
//! `BookingEngine` and an untrusted external payment gateway.

pub mod coordinator;
pub mod order_ref;
pub mod registry;
pub mod signature;
pub mod store;

pub use coordinator::{CallbackOutcome, CallbackSource, Outcome, PaymentCoordinator, PaymentIntent};
pub use registry::GatewayRegistry;
pub use store::{InMemoryPaymentStore, PaymentStore, PgPaymentStore};
