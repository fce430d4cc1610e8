use crate::models::Payment;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create_pending(
    pool: &PgPool,
    booking_id: Uuid,
    gateway: &str,
    order_reference: &str,
    amount_minor: i32,
) -> sqlx::Result<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (booking_id, gateway, order_reference, amount_minor, status)
        VALUES ($1, $2, $3, $4, 'pending')
        RETURNING *
        "#,
    )
    .bind(booking_id)
    .bind(gateway)
    .bind(order_reference)
    .bind(amount_minor)
    .fetch_one(pool)
    .await
}

pub async fn find_by_order_reference(
    pool: &PgPool,
    order_reference: &str,
) -> sqlx::Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_reference = $1")
        .bind(order_reference)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_booking_id(pool: &PgPool, booking_id: Uuid) -> sqlx::Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE booking_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(booking_id)
    .fetch_optional(pool)
    .await
}

/// Atomically transitions a payment from `from` to `to`. This is the single
/// convergence point for both the return-URL and IPN callback paths — both
/// race to call this, and only one of them wins the CAS, which is what
/// makes exactly-once confirmation hold regardless of delivery order.
pub async fn transition_status(
    pool: &PgPool,
    id: Uuid,
    from: &str,
    to: &str,
    provider_transaction_id: Option<&str>,
) -> sqlx::Result<Option<Payment>> {
    let paid_at = if to == "completed" { Some(Utc::now()) } else { None };

    sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET status = $3,
            provider_transaction_id = COALESCE($4, provider_transaction_id),
            paid_at = COALESCE($5, paid_at),
            updated_at = NOW()
        WHERE id = $1 AND status = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(provider_transaction_id)
    .bind(paid_at)
    .fetch_optional(pool)
    .await
}
