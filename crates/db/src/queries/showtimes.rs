use crate::models::Showtime;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// List upcoming showtimes, optionally filtered by movie.
pub async fn list_upcoming(pool: &PgPool, movie_id: Option<Uuid>) -> sqlx::Result<Vec<Showtime>> {
    let showtimes = match movie_id {
        Some(movie_id) => {
            sqlx::query_as::<_, Showtime>(
                "SELECT * FROM showtimes WHERE movie_id = $1 AND starts_at >= NOW() ORDER BY starts_at ASC",
            )
            .bind(movie_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Showtime>(
                "SELECT * FROM showtimes WHERE starts_at >= NOW() ORDER BY starts_at ASC",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(showtimes)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Showtime>> {
    sqlx::query_as::<_, Showtime>("SELECT * FROM showtimes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: Uuid,
) -> sqlx::Result<Option<Showtime>> {
    sqlx::query_as::<_, Showtime>("SELECT * FROM showtimes WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn starts_before(pool: &PgPool, id: Uuid, instant: DateTime<Utc>) -> sqlx::Result<bool> {
    let showtime = find_by_id(pool, id).await?;
    Ok(showtime.map(|s| s.starts_at < instant).unwrap_or(true))
}
