//! Message persistence. The pipeline treats stored turns as opaque
//! read-only history; this module owns the SQL.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::message::MessageRow;

/// Loads a user's turns, oldest first.
pub async fn list_messages(pool: &PgPool, user_id: Uuid) -> Result<Vec<MessageRow>, sqlx::Error> {
    sqlx::query_as::<_, MessageRow>(
        "SELECT * FROM messages WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Appends one turn and returns the stored row.
pub async fn insert_message(
    pool: &PgPool,
    user_id: Uuid,
    role: &str,
    content: &str,
    auxiliary_data: Option<Value>,
) -> Result<MessageRow, sqlx::Error> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        INSERT INTO messages (id, user_id, role, content, auxiliary_data)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(role)
    .bind(content)
    .bind(auxiliary_data)
    .fetch_one(pool)
    .await
}
