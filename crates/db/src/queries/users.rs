use crate::models::User;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
