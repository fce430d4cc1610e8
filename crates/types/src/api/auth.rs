use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity of the caller, resolved by the auth middleware from a bearer
/// token. Authentication itself (how the token was issued) is outside this
/// crate's scope; this is the shape every handler receives once it's done.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}
