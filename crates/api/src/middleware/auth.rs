//! Bearer-token authentication extractors: `AuthUser`/`StaffUser`
//! implement `FromRequestParts` against the plain HS256 `AuthVerifier`
//! (spec §1 scopes "full user registration/login flows" out — this only
//! verifies a token someone else issued).

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use cineslot_core::seat_store::SeatStore;
use cineslot_core::{BookingEngine, Config};
use cineslot_db::PgPool;
use cineslot_integrations::{AuthVerifier, PaymentCoordinator};
use cineslot_types::AppError;
use std::sync::Arc;
use uuid::Uuid;

use crate::response::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: AuthVerifier,
    pub booking_engine: Arc<BookingEngine>,
    pub payment_coordinator: Arc<PaymentCoordinator>,
    pub seat_store: Arc<dyn SeatStore>,
    pub config: Arc<Config>,
}

/// Resolved caller identity (`user token` column of spec §6's endpoint
/// table). Usage: `async fn handler(user: AuthUser, ...)`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: String,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.role == "staff" || self.role == "admin"
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let app_state = AppState::from_ref(state);

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::at(&path, AppError::Unauthenticated))?;

        let claims = app_state
            .auth
            .verify_access_token(bearer.token())
            .map_err(|e| ApiError::at(&path, e))?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// `staff token` column of spec §6's endpoint table
/// (`POST /bookings/verify-qr`): same token, but the caller must carry the
/// staff or admin role.
pub struct StaffUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff() {
            return Err(ApiError::at(path, AppError::Forbidden));
        }
        Ok(StaffUser(user))
    }
}
