//! HTTP boundary consumed by the browser UI: `/search`, `/summarize`,
//! and a `/health` probe.

mod errors;
mod handlers;
mod models;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::gemini::GeminiClient;
use crate::langsearch::LangSearchClient;

/// Upstream clients shared by all requests. A missing credential leaves
/// the corresponding client unset; handlers answer with a configuration
/// error instead of attempting the call.
#[derive(Clone)]
pub struct AppState {
    pub langsearch: Option<LangSearchClient>,
    pub gemini: Option<GeminiClient>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", post(handlers::search))
        .route("/summarize", post(handlers::summarize))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(cors)
}
