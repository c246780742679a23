use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::config::Config;
use crate::openrouter::client::PromptEnhancer;
use crate::replicate::client::ImageJobRunner;

/// Shared, read-only per-process state. Each request runs its own
/// enhance/generate call against these clients.
pub struct AppState {
    pub enhancer: PromptEnhancer,
    pub runner: ImageJobRunner,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        AppState {
            enhancer: PromptEnhancer::from_config(config),
            runner: ImageJobRunner::from_config(config),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/enhance-prompt", post(handlers::enhance_prompt))
        .route("/generate-image", post(handlers::generate_image))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
