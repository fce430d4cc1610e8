use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Minimal user row — registration, password hashing, and profile fields
/// are out of scope (spec §1); this crate only needs enough to resolve an
/// already-authenticated principal's id, email, and role for authorization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn is_staff(&self) -> bool {
        self.role == "admin" || self.role == "staff"
    }
}
