//! `PaymentCoordinator` (spec §4.3): bridges `BookingEngine` and an opaque,
//! untrusted gateway that calls back twice per attempt (return + notify),
//! possibly lost, duplicated, reordered, or forged. The `Payment` row's
//! `PENDING -> COMPLETED|FAILED` compare-and-set is the sole
//! de-duplication point — both callback paths race to call
//! `PaymentStore::transition_status` and only one wins, which is what
//! makes confirmation exactly-once regardless of delivery order (P5/P6).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use cineslot_core::BookingEngine;
use cineslot_db::models::Payment;
use cineslot_types::{enums::PaymentStatus, AppError, Result};
use uuid::Uuid;

use super::order_ref;
use super::registry::GatewayRegistry;
use super::signature;
use super::store::PaymentStore;

/// Which leg of the two-callback contract delivered this payload — the
/// user-agent redirect or the server-to-server notification. Both are
/// handled identically by the coordinator; the distinction only matters to
/// the API layer building a redirect vs. an acknowledgement body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackSource {
    Return,
    Notify,
}

pub struct PaymentIntent {
    pub payment_id: Uuid,
    pub order_reference: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub outcome: Outcome,
    pub booking_id: Uuid,
    pub human_message: String,
}

pub struct PaymentCoordinator {
    store: Arc<dyn PaymentStore>,
    booking_engine: Arc<BookingEngine>,
    gateways: GatewayRegistry,
}

impl PaymentCoordinator {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        booking_engine: Arc<BookingEngine>,
        gateways: GatewayRegistry,
    ) -> Self {
        Self {
            store,
            booking_engine,
            gateways,
        }
    }

    /// Preconditions: booking is PENDING; no existing COMPLETED payment
    /// (I6); any existing PENDING payment is superseded (marked FAILED)
    /// first, so a retry with a different method is always possible.
    pub async fn create_intent(
        &self,
        gateway_name: &str,
        booking_id: Uuid,
        client_ip: Option<&str>,
    ) -> Result<PaymentIntent> {
        let gateway = self.gateways.get(gateway_name)?;
        let booking = self.booking_engine.get(booking_id).await?;

        if booking.status != "pending" {
            return Err(AppError::InvalidTransition(
                "booking is not pending payment".to_string(),
            ));
        }

        if let Some(existing) = self.store.find_latest_by_booking_id(booking_id).await? {
            let existing_status = existing.status.parse::<PaymentStatus>().unwrap_or_default();
            if existing_status == PaymentStatus::Completed {
                return Err(AppError::Conflict("booking is already paid".to_string()));
            }
            if existing_status.can_transition_to(PaymentStatus::Failed) {
                self.store
                    .transition_status(existing.id, "pending", "failed", None)
                    .await?;
            }
        }

        let order_reference = order_ref::build_now(booking_id);

        let payment = self
            .store
            .create_pending(
                booking_id,
                gateway_name,
                &order_reference,
                booking.total_price_minor,
            )
            .await?;

        let redirect_url = build_redirect_url(gateway, &payment, client_ip);

        Ok(PaymentIntent {
            payment_id: payment.id,
            order_reference,
            redirect_url,
        })
    }

    /// Step 1 authenticates; an unverified signature never touches state
    /// and is the one path that returns `Err` rather than a `Failure`
    /// outcome — the distinction the API layer needs to answer P6 with
    /// HTTP 400 `invalid-signature` instead of a gateway-style redirect.
    pub async fn handle_callback(
        &self,
        _source: CallbackSource,
        mut params: BTreeMap<String, String>,
    ) -> Result<CallbackOutcome> {
        let gateway_name = params
            .get("gateway")
            .cloned()
            .ok_or_else(|| AppError::Validation("missing gateway field".to_string()))?;
        let gateway = self.gateways.get(&gateway_name)?;

        let signature_hex = params
            .remove("signature")
            .ok_or(AppError::InvalidSignature)?;
        params.remove("gateway");

        if !signature::verify(&params, &gateway.hash_secret, gateway.algorithm, &signature_hex) {
            return Err(AppError::InvalidSignature);
        }

        let order_reference = params
            .get("order_reference")
            .ok_or_else(|| AppError::Validation("missing order_reference".to_string()))?;

        let (booking_id, _millis) = order_ref::parse(order_reference)
            .ok_or_else(|| AppError::NotFound("unknown order reference".to_string()))?;

        let payment = self
            .store
            .find_by_order_reference(order_reference)
            .await?
            .ok_or_else(|| AppError::NotFound("unknown order reference".to_string()))?;

        // Idempotency: a terminal payment short-circuits without touching
        // the booking again, regardless of how many times this callback
        // is replayed (P5).
        let current_status = payment.status.parse::<PaymentStatus>().unwrap_or_default();
        if current_status.is_terminal() {
            return Ok(CallbackOutcome {
                outcome: if current_status == PaymentStatus::Completed {
                    Outcome::Success
                } else {
                    Outcome::Failure
                },
                booking_id,
                human_message: format!("payment already {}", payment.status),
            });
        }

        let gateway_succeeded = params
            .get("response_code")
            .map(|code| code == "00")
            .unwrap_or(false);
        let provider_transaction_id = params.get("transaction_id").map(String::as_str);

        if gateway_succeeded {
            let transitioned = self
                .store
                .transition_status(payment.id, "pending", "completed", provider_transaction_id)
                .await?;

            if transitioned.is_some() {
                self.booking_engine.confirm(booking_id).await?;
            }

            Ok(CallbackOutcome {
                outcome: Outcome::Success,
                booking_id,
                human_message: "payment confirmed".to_string(),
            })
        } else {
            let transitioned = self
                .store
                .transition_status(payment.id, "pending", "failed", provider_transaction_id)
                .await?;

            if transitioned.is_some() {
                let booking = self.booking_engine.get(booking_id).await?;
                if booking.status == "pending" {
                    self.booking_engine.cancel(booking_id).await?;
                }
            }

            Ok(CallbackOutcome {
                outcome: Outcome::Failure,
                booking_id,
                human_message: params
                    .get("response_code")
                    .map(|c| format!("gateway declined (code {c})"))
                    .unwrap_or_else(|| "gateway declined".to_string()),
            })
        }
    }

    /// Permitted only from COMPLETED; cancels the associated booking via
    /// the refund path (spec §4.2).
    pub async fn refund(&self, payment_id: Uuid) -> Result<Payment> {
        let payment = self
            .store
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment {payment_id}")))?;

        let current_status = payment.status.parse::<PaymentStatus>().unwrap_or_default();
        if !current_status.can_transition_to(PaymentStatus::Refunded) {
            return Err(AppError::InvalidTransition(
                "payment is not completed".to_string(),
            ));
        }

        let refunded = self
            .store
            .transition_status(payment.id, "completed", "refunded", None)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition("payment is not completed".to_string())
            })?;

        self.booking_engine.cancel(refunded.booking_id).await?;

        Ok(refunded)
    }
}

fn build_redirect_url(
    gateway: &cineslot_core::config::GatewayConfig,
    payment: &Payment,
    client_ip: Option<&str>,
) -> String {
    let mut params = BTreeMap::new();
    params.insert("tmn_code".to_string(), gateway.tmn_code.clone());
    // Minor-currency units, multiplied by 100 per the gateway's "x100"
    // amount encoding (spec §6).
    params.insert(
        "amount".to_string(),
        (payment.amount_minor as i64 * 100).to_string(),
    );
    params.insert(
        "order_reference".to_string(),
        payment.order_reference.clone(),
    );
    params.insert("return_url".to_string(), gateway.return_url.clone());
    params.insert(
        "create_date".to_string(),
        Utc::now().format("%Y%m%d%H%M%S").to_string(),
    );
    params.insert(
        "ip_addr".to_string(),
        client_ip.unwrap_or("127.0.0.1").to_string(),
    );

    let signature = signature::sign(&params, &gateway.hash_secret, gateway.algorithm);
    let query = signature::canonicalize(&params);

    format!("{}?{}&signature={}", gateway.url, query, signature)
}
