use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// The prompt-chain pipeline with its injected model service.
    /// Holds no per-invocation state; concurrent requests share it freely.
    pub pipeline: Arc<Pipeline>,
    /// Retained for handlers that need deployment settings (none yet).
    #[allow(dead_code)]
    pub config: Config,
}
