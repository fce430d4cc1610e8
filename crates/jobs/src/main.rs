mod jobs;

use std::sync::Arc;

use cineslot_core::booking::BookingEngine;
use cineslot_core::booking_store::PgBookingStore;
use cineslot_core::events::EventBus;
use cineslot_core::notify::LoggingNotifier;
use cineslot_core::seat_store::{PgSeatStore, SeatStore};
use cineslot_core::Config;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cineslot_jobs=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cineslot background jobs...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let pool = cineslot_db::create_pool(&config.database_url).await?;

    tracing::info!("✓ Database connection established");

    let events = EventBus::new();
    let seat_store: Arc<dyn SeatStore> = Arc::new(PgSeatStore::new(pool.clone(), events));
    let booking_store = Arc::new(PgBookingStore::new(pool.clone()));
    let notifier = Arc::new(LoggingNotifier);
    let booking_engine = Arc::new(BookingEngine::new(
        booking_store,
        seat_store.clone(),
        notifier,
        config.hold_ttl,
    ));

    let scheduler = JobScheduler::new().await?;

    // Booking-expiry sweep: cancels every PENDING booking past its hold
    // deadline. Cadence is configurable since a busy deployment may want a
    // tighter loop than a quiet one.
    let pool_for_bookings = pool.clone();
    let engine_for_bookings = booking_engine.clone();
    let booking_sweep_job = Job::new_repeated_async(config.sweep_interval_bookings, move |_uuid, _l| {
        let pool = pool_for_bookings.clone();
        let engine = engine_for_bookings.clone();
        Box::pin(async move {
            if let Err(e) = jobs::sweep_expired_bookings(&pool, &engine).await {
                tracing::error!("sweep_expired_bookings job failed: {e}");
            }
        })
    })?;
    scheduler.add(booking_sweep_job).await?;
    tracing::info!(
        interval_secs = config.sweep_interval_bookings.as_secs(),
        "✓ Registered job: sweep_expired_bookings"
    );

    // Hold sweep: releases any seat hold past its TTL across every
    // showtime, as a backstop for holds whose booking row never existed or
    // was lost.
    let seat_store_for_sweep = seat_store.clone();
    let hold_sweep_job = Job::new_repeated_async(config.sweep_interval_holds, move |_uuid, _l| {
        let seat_store = seat_store_for_sweep.clone();
        Box::pin(async move {
            if let Err(e) = jobs::sweep_expired_holds(&seat_store).await {
                tracing::error!("sweep_expired_holds job failed: {e}");
            }
        })
    })?;
    scheduler.add(hold_sweep_job).await?;
    tracing::info!(
        interval_secs = config.sweep_interval_holds.as_secs(),
        "✓ Registered job: sweep_expired_holds"
    );

    scheduler.start().await?;

    tracing::info!("✓ Job scheduler started");
    tracing::info!("Background jobs running");

    loop {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
    }
}
