pub mod auth;
pub mod gateway;

pub use auth::AuthVerifier;
pub use gateway::{GatewayRegistry, PaymentCoordinator};
