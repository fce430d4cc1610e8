//! `PaymentStore`: abstracts payment persistence the same way
//! `cineslot-core::booking_store::BookingStore` abstracts booking
//! persistence, so `PaymentCoordinator`'s callback-idempotence properties
//! (P5/P6) can be tested against an in-memory double instead of a live
//! database.

use async_trait::async_trait;
use chrono::Utc;
use cineslot_db::models::Payment;
use cineslot_db::PgPool;
use cineslot_types::{AppError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create_pending(
        &self,
        booking_id: Uuid,
        gateway: &str,
        order_reference: &str,
        amount_minor: i32,
    ) -> Result<Payment>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;

    async fn find_by_order_reference(&self, order_reference: &str) -> Result<Option<Payment>>;

    async fn find_latest_by_booking_id(&self, booking_id: Uuid) -> Result<Option<Payment>>;

    /// Atomic `from` -> `to` transition; `None` if the row wasn't in
    /// `from` at the time of the update. This is the sole convergence
    /// point for the return and notification callback paths (spec §4.3).
    async fn transition_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
        provider_transaction_id: Option<&str>,
    ) -> Result<Option<Payment>>;
}

pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn create_pending(
        &self,
        booking_id: Uuid,
        gateway: &str,
        order_reference: &str,
        amount_minor: i32,
    ) -> Result<Payment> {
        cineslot_db::queries::payments::create_pending(
            &self.pool,
            booking_id,
            gateway,
            order_reference,
            amount_minor,
        )
        .await
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        cineslot_db::queries::payments::find_by_id(&self.pool, id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn find_by_order_reference(&self, order_reference: &str) -> Result<Option<Payment>> {
        cineslot_db::queries::payments::find_by_order_reference(&self.pool, order_reference)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn find_latest_by_booking_id(&self, booking_id: Uuid) -> Result<Option<Payment>> {
        cineslot_db::queries::payments::find_by_booking_id(&self.pool, booking_id)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
        provider_transaction_id: Option<&str>,
    ) -> Result<Option<Payment>> {
        cineslot_db::queries::payments::transition_status(
            &self.pool,
            id,
            from,
            to,
            provider_transaction_id,
        )
        .await
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<Mutex<HashMap<Uuid, Payment>>>,
    by_reference: Arc<Mutex<HashMap<String, Uuid>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create_pending(
        &self,
        booking_id: Uuid,
        gateway: &str,
        order_reference: &str,
        amount_minor: i32,
    ) -> Result<Payment> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let payment = Payment {
            id,
            booking_id,
            gateway: gateway.to_string(),
            order_reference: order_reference.to_string(),
            amount_minor,
            status: "pending".to_string(),
            provider_transaction_id: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        self.by_reference
            .lock()
            .await
            .insert(order_reference.to_string(), id);
        self.payments.lock().await.insert(id, payment.clone());
        Ok(payment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        Ok(self.payments.lock().await.get(&id).cloned())
    }

    async fn find_by_order_reference(&self, order_reference: &str) -> Result<Option<Payment>> {
        let by_reference = self.by_reference.lock().await;
        let Some(id) = by_reference.get(order_reference) else {
            return Ok(None);
        };
        Ok(self.payments.lock().await.get(id).cloned())
    }

    async fn find_latest_by_booking_id(&self, booking_id: Uuid) -> Result<Option<Payment>> {
        let payments = self.payments.lock().await;
        Ok(payments
            .values()
            .filter(|p| p.booking_id == booking_id)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
        provider_transaction_id: Option<&str>,
    ) -> Result<Option<Payment>> {
        let mut payments = self.payments.lock().await;
        let Some(payment) = payments.get_mut(&id) else {
            return Ok(None);
        };
        if payment.status != from {
            return Ok(None);
        }
        payment.status = to.to_string();
        payment.updated_at = Utc::now();
        if let Some(txn_id) = provider_transaction_id {
            payment.provider_transaction_id = Some(txn_id.to_string());
        }
        if to == "completed" {
            payment.paid_at = Some(payment.updated_at);
        }
        Ok(Some(payment.clone()))
    }
}
