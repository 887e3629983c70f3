pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::messages::handlers as message_handlers;
use crate::state::AppState;
use crate::users::handlers as user_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/auth", post(user_handlers::handle_auth))
        .route(
            "/messages",
            post(message_handlers::handle_post_message)
                .get(message_handlers::handle_list_messages),
        )
        .with_state(state)
}
