//! Router assembly: generation endpoints, landing page, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - `GET /` landing page (`INDEX_PATH`)
/// - `GET /static/*` assets (`STATIC_DIR`)
/// - `GET /generate-topics` and `GET /generate-problems`
/// - `GET /health`
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let index = ServeFile::new(&state.settings.index_path);
    let assets = ServeDir::new(&state.settings.static_dir);

    Router::new()
        .route_service("/", index)
        .nest_service("/static", assets)
        .route("/health", get(http::http_health))
        .route("/generate-topics", get(http::http_get_topics))
        .route("/generate-problems", get(http::http_get_problems))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
