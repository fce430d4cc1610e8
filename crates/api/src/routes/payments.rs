//! Payment gateway endpoints (spec §6, §4.3): `create` is authenticated and
//! JSON; `return` and `-ipn` are the gateway's two unauthenticated
//! callbacks, both routed to the same `PaymentCoordinator::handle_callback`
//! so the Payment-row CAS is the single point of convergence regardless of
//! which leg arrives first (spec §9's "implementers should not add an
//! additional process-on-return shortcut").

use std::collections::BTreeMap;

use axum::extract::{ConnectInfo, OriginalUri, Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use cineslot_integrations::gateway::{CallbackSource, Outcome};
use cineslot_types::api::{CreateIntentRequest, CreateIntentResponse, GatewayReturnQuery};
use cineslot_types::AppError;
use std::net::SocketAddr;

use crate::middleware::{AppState, AuthUser};
use crate::response::ApiError;

/// `POST /payments/{gateway}/create`.
pub async fn create_intent(
    _user: AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(gateway): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, ApiError> {
    let client_ip = addr.ip().to_string();
    let intent = state
        .payment_coordinator
        .create_intent(&gateway, payload.booking_id, Some(&client_ip))
        .await
        .map_err(|e| ApiError::at(uri.path(), e))?;

    Ok(Json(CreateIntentResponse {
        order_reference: intent.order_reference,
        redirect_url: intent.redirect_url,
    }))
}

/// `GET /payments/{gateway}-return`: user-agent redirect. Always sends the
/// browser somewhere — success or failure page — never a raw error (spec
/// §7): "the user never sees a raw stack trace."
pub async fn handle_return(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<GatewayReturnQuery>,
) -> impl IntoResponse {
    let mut params = query.fields;
    params.insert("gateway".to_string(), strip_suffix(&segment, "-return"));

    match state
        .payment_coordinator
        .handle_callback(CallbackSource::Return, params)
        .await
    {
        Ok(outcome) => match outcome.outcome {
            Outcome::Success => Redirect::to(&format!(
                "{}/payment/success?bookingId={}",
                state.config.frontend_url, outcome.booking_id
            )),
            Outcome::Failure => Redirect::to(&format!(
                "{}/payment/failed?message={}",
                state.config.frontend_url,
                urlencode(&outcome.human_message)
            )),
        },
        Err(e) => Redirect::to(&format!(
            "{}/payment/failed?message={}",
            state.config.frontend_url,
            urlencode(&e.to_string())
        )),
    }
}

/// `POST /payments/{gateway}-ipn`: server-to-server notification.
/// Authoritative and idempotent — returns the gateway's expected
/// acknowledgement body rather than a redirect.
pub async fn handle_notify(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(segment): Path<String>,
    Json(mut params): Json<BTreeMap<String, String>>,
) -> Result<Json<IpnAck>, ApiError> {
    params.insert("gateway".to_string(), strip_suffix(&segment, "-ipn"));

    match state
        .payment_coordinator
        .handle_callback(CallbackSource::Notify, params)
        .await
    {
        Ok(outcome) => Ok(Json(IpnAck {
            rsp_code: "00".to_string(),
            message: outcome.human_message,
        })),
        Err(AppError::InvalidSignature) => Ok(Json(IpnAck {
            rsp_code: "97".to_string(),
            message: "invalid signature".to_string(),
        })),
        Err(e) => Err(ApiError::at(uri.path(), e)),
    }
}

/// Acknowledgement body the gateway's IPN contract expects (spec §4.3).
#[derive(serde::Serialize)]
pub struct IpnAck {
    #[serde(rename = "RspCode")]
    pub rsp_code: String,
    pub message: String,
}

fn strip_suffix(segment: &str, suffix: &str) -> String {
    segment.strip_suffix(suffix).unwrap_or(segment).to_string()
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
