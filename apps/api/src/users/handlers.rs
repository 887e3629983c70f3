//! Axum route handlers for the Users API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub email: String,
}

/// POST /auth
///
/// Finds or creates the user for the given email and returns the row.
pub async fn handle_auth(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<UserRow>, AppError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }

    let existing = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    if let Some(user) = existing {
        return Ok(Json(user));
    }

    let user = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, email) VALUES ($1, $2) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(user))
}
