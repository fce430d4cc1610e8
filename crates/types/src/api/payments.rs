use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::enums::PaymentStatus;

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct PaymentResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub gateway: String,
    pub order_reference: String,
    pub amount_minor: i32,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIntentRequest {
    pub booking_id: Uuid,
}

/// What the client needs to redirect the user into the gateway's hosted
/// checkout page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export, export_to = "../../../../frontend/src/lib/types/")]
pub struct CreateIntentResponse {
    pub order_reference: String,
    pub redirect_url: String,
}

/// Query parameters the gateway appends to the browser return-URL redirect.
/// Carries the same signed fields as the IPN body, over a GET instead of a
/// POST (spec §4.3's "return" path).
#[derive(Debug, Deserialize, ToSchema)]
pub struct GatewayReturnQuery {
    #[serde(flatten)]
    pub fields: std::collections::BTreeMap<String, String>,
}
