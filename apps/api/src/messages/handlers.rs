//! Axum route handlers for the Messages API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::messages::store::{insert_message, list_messages};
use crate::models::message::MessageRow;
use crate::models::user::UserRow;
use crate::pipeline::schemas::{ConversationTurn, PipelineOutcome};
use crate::state::AppState;

/// Response string for messages the gate rejects. Not an error: the caller
/// gets a 200 and can tell this apart from a failed model call.
const NOT_APPLICABLE_MESSAGE: &str = "This doesn't appear to be a request for a recruiter.";

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PostMessageResponse {
    pub applicable: bool,
    pub message: String,
    /// Structured stage payload backing `message`, when the gate passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// POST /messages
///
/// Stores the inbound turn, runs the pipeline over it with the user's
/// prior turns as history, then stores and returns the outcome.
pub async fn handle_post_message(
    State(state): State<AppState>,
    Json(request): Json<PostMessageRequest>,
) -> Result<Json<PostMessageResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(request.user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.user_id)))?;

    let prior = list_messages(&state.db, user.id).await?;
    let history: Vec<ConversationTurn> = prior.iter().map(ConversationTurn::from).collect();

    insert_message(&state.db, user.id, "user", &request.message, None).await?;

    let outcome = state
        .pipeline
        .process(
            &request.message,
            (!history.is_empty()).then_some(history.as_slice()),
        )
        .await?;

    let response = match outcome {
        PipelineOutcome::Confirmed { role, confirmation } => {
            let payload = json!({ "role": role });
            insert_message(
                &state.db,
                user.id,
                "system",
                &confirmation.message,
                Some(payload.clone()),
            )
            .await?;
            PostMessageResponse {
                applicable: true,
                message: confirmation.message,
                payload: Some(payload),
            }
        }
        PipelineOutcome::Replied(reply) => {
            let payload = json!({ "confirmation": reply.confirmation });
            insert_message(
                &state.db,
                user.id,
                "system",
                &reply.reply,
                Some(payload.clone()),
            )
            .await?;
            PostMessageResponse {
                applicable: true,
                message: reply.reply,
                payload: Some(payload),
            }
        }
        PipelineOutcome::NotApplicable => PostMessageResponse {
            applicable: false,
            message: NOT_APPLICABLE_MESSAGE.to_string(),
            payload: None,
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /messages?user_id=
///
/// Returns the user's stored turns, oldest first.
pub async fn handle_list_messages(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<MessageRow>>, AppError> {
    Ok(Json(list_messages(&state.db, params.user_id).await?))
}
