mod middleware;
mod response;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use cineslot_core::{BookingEngine, Config};
use cineslot_core::booking_store::PgBookingStore;
use cineslot_core::events::EventBus;
use cineslot_core::notify::LoggingNotifier;
use cineslot_core::seat_store::PgSeatStore;
use cineslot_integrations::gateway::{GatewayRegistry, PaymentCoordinator, PgPaymentStore};
use cineslot_integrations::AuthVerifier;
use middleware::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cineslot_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cineslot API server...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let pool = match cineslot_db::create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("failed to connect to storage: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!("✓ Database connection established");

    let events = EventBus::new();
    let seat_store: Arc<dyn cineslot_core::seat_store::SeatStore> =
        Arc::new(PgSeatStore::new(pool.clone(), events.clone()));
    let booking_store = Arc::new(PgBookingStore::new(pool.clone()));
    let notifier = Arc::new(LoggingNotifier);

    let booking_engine = Arc::new(BookingEngine::new(
        booking_store,
        seat_store.clone(),
        notifier,
        config.hold_ttl,
    ));

    let payment_store = Arc::new(PgPaymentStore::new(pool.clone()));
    let gateways = GatewayRegistry::new(config.gateways.clone());
    let payment_coordinator = Arc::new(PaymentCoordinator::new(
        payment_store,
        booking_engine.clone(),
        gateways,
    ));

    let auth = AuthVerifier::new(config.jwt_secret.clone(), config.jwt_refresh_secret.clone());

    let frontend_url = config.frontend_url.clone();
    let port = config.port;

    let state = AppState {
        db: pool,
        auth,
        booking_engine,
        payment_coordinator,
        seat_store,
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/showtimes/:id/seats", get(routes::showtimes::get_seats))
        .route("/bookings", post(routes::bookings::create_booking))
        .route("/bookings", get(routes::bookings::list_bookings))
        .route("/bookings/:id", get(routes::bookings::get_booking))
        .route(
            "/bookings/code/:code",
            get(routes::bookings::get_booking_by_code),
        )
        .route(
            "/bookings/:id/cancel",
            patch(routes::bookings::cancel_booking),
        )
        .route("/bookings/verify-qr", post(routes::bookings::verify_qr))
        .route(
            "/payments/:gateway/create",
            post(routes::payments::create_intent),
        )
        // The gateway-suffixed segment (`{gateway}-return` / `{gateway}-ipn`)
        // is one path segment on the wire, not two — axum can't split a
        // param from a literal suffix within a single segment, so both
        // verbs share a `:segment` route and the handler itself strips the
        // suffix to recover the gateway name (see routes::payments).
        .route(
            "/payments/:segment",
            get(routes::payments::handle_return).post(routes::payments::handle_notify),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(frontend_url.parse::<axum::http::HeaderValue>()?)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("✓ Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
