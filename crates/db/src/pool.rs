use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Opens the connection pool. A failure here is the process's exit-code-2
/// case: the caller should treat it as fatal startup failure, not retry.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await
}
