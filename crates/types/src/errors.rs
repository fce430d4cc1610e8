use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("invalid gateway signature")]
    InvalidSignature,

    #[error("gateway declined: {0}")]
    GatewayDeclined(String),

    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code this error maps to at the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Database(_) | Self::Internal(_) => 500,
            Self::StorageUnavailable(_) => 503,
            Self::NotFound(_) => 404,
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::Validation(_) | Self::InvalidSignature => 400,
            Self::Conflict(_) | Self::InvalidTransition(_) => 409,
            Self::GatewayDeclined(_) => 402,
            Self::GatewayUnavailable(_) => 502,
        }
    }
}
