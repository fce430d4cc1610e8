//! Protocol-level tests for `PaymentCoordinator` (spec §8, P5/P6), driven
//! against `InMemoryBookingStore` + `InMemorySeatStore` + `BookingEngine`
//! + `InMemoryPaymentStore` and a hand-signed fake gateway callback, so
//! they run without a live Postgres instance or a real gateway.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cineslot_core::config::GatewayConfig;
use cineslot_core::notify::LoggingNotifier;
use cineslot_core::{BookingEngine, InMemoryBookingStore, InMemorySeatStore};
use cineslot_db::models::Showtime;
use cineslot_integrations::gateway::{
    signature, CallbackSource, GatewayRegistry, InMemoryPaymentStore, PaymentCoordinator,
};
use cineslot_types::enums::SignatureAlgorithm;
use uuid::Uuid;

const SECRET: &str = "test-hash-secret";

fn gateway_config() -> GatewayConfig {
    GatewayConfig {
        name: "testgw".to_string(),
        tmn_code: "TESTCODE".to_string(),
        hash_secret: SECRET.to_string(),
        url: "https://gateway.example/pay".to_string(),
        return_url: "https://app.example/return".to_string(),
        algorithm: SignatureAlgorithm::HmacSha512,
    }
}

async fn setup() -> (Arc<BookingEngine>, PaymentCoordinator, Showtime) {
    let st = Showtime {
        id: Uuid::new_v4(),
        movie_id: Uuid::new_v4(),
        theater_id: Uuid::new_v4(),
        starts_at: Utc::now() + chrono::Duration::hours(2),
        price_minor: 10000,
        capacity: 2,
        created_at: Utc::now(),
    };

    let booking_store = InMemoryBookingStore::new();
    booking_store.register_showtime(st.clone()).await;

    let seat_store = InMemorySeatStore::new();
    seat_store.register_showtime(st.id, st.capacity).await;

    let engine = Arc::new(BookingEngine::new(
        Arc::new(booking_store),
        Arc::new(seat_store),
        Arc::new(LoggingNotifier),
        Duration::from_secs(600),
    ));

    let registry = GatewayRegistry::new(vec![gateway_config()]);
    let coordinator = PaymentCoordinator::new(
        Arc::new(InMemoryPaymentStore::new()),
        engine.clone(),
        registry,
    );

    (engine, coordinator, st)
}

fn sign_params(mut params: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let signature = signature::sign(&params, SECRET, SignatureAlgorithm::HmacSha512);
    params.insert("signature".to_string(), signature);
    params
}

fn success_callback(gateway: &str, order_reference: &str, txn_id: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("gateway".to_string(), gateway.to_string());
    params.insert("order_reference".to_string(), order_reference.to_string());
    params.insert("response_code".to_string(), "00".to_string());
    params.insert("transaction_id".to_string(), txn_id.to_string());
    sign_params(params)
}

#[tokio::test]
async fn p5_duplicate_notification_confirms_exactly_once() {
    let (engine, coordinator, st) = setup().await;

    let booking = engine
        .create(Uuid::new_v4(), st.id, vec!["A1".to_string()])
        .await
        .unwrap();

    let intent = coordinator
        .create_intent("testgw", booking.id, Some("127.0.0.1"))
        .await
        .unwrap();

    // Recover the order reference the same way a real gateway would: from
    // the redirect URL's own query string.
    let order_reference = intent
        .redirect_url
        .split("order_reference=")
        .nth(1)
        .unwrap()
        .split('&')
        .next()
        .unwrap()
        .to_string();

    let params = success_callback("testgw", &order_reference, "TXN-1");

    for _ in 0..3 {
        let outcome = coordinator
            .handle_callback(CallbackSource::Notify, params.clone())
            .await
            .unwrap();
        assert_eq!(outcome.booking_id, booking.id);
    }

    let confirmed = engine.confirm(booking.id).await.unwrap();
    assert_eq!(confirmed.status, "confirmed");
}

#[tokio::test]
async fn p6_forged_signature_leaves_state_unchanged() {
    let (engine, coordinator, st) = setup().await;

    let booking = engine
        .create(Uuid::new_v4(), st.id, vec!["A1".to_string()])
        .await
        .unwrap();

    let intent = coordinator
        .create_intent("testgw", booking.id, None)
        .await
        .unwrap();
    let order_reference = intent
        .redirect_url
        .split("order_reference=")
        .nth(1)
        .unwrap()
        .split('&')
        .next()
        .unwrap()
        .to_string();

    let mut params = success_callback("testgw", &order_reference, "TXN-2");
    let sig = params.get_mut("signature").unwrap();
    let last = sig.pop().unwrap();
    sig.push(if last == '0' { '1' } else { '0' });

    let err = coordinator
        .handle_callback(CallbackSource::Notify, params)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let still_pending = engine.get(booking.id).await.unwrap();
    assert_eq!(still_pending.status, "pending");
}
