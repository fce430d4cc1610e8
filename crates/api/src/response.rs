//! The single error envelope every failed request shares (spec §6):
//! `{statusCode, message, timestamp, path}`. `AppError` carries no
//! knowledge of HTTP or axum — this module is the one place that bridges
//! it to a `Response`: a single `IntoResponse for ApiError` impl (status +
//! JSON body, server errors logged on the way out).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use cineslot_types::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub message: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub path: String,
}

/// `AppError` tagged with the request path it failed on. Handlers build
/// this with `ApiError::at(path, err)` in their `.map_err`, centralizing
/// the `status_code()` -> `StatusCode` mapping into one place instead of
/// repeating it inline at every call site.
pub struct ApiError {
    error: AppError,
    path: String,
}

impl ApiError {
    pub fn at(path: impl Into<String>, error: impl Into<AppError>) -> Self {
        Self {
            error: error.into(),
            path: path.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.error.status_code();
        let status =
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(path = %self.path, error = %self.error, "request failed");
        } else {
            tracing::debug!(path = %self.path, error = %self.error, "request rejected");
        }

        let body = ErrorEnvelope {
            status_code,
            message: self.error.to_string(),
            timestamp: Utc::now(),
            path: self.path,
        };

        (status, Json(body)).into_response()
    }
}
