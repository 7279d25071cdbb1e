//! Spectrogram API service library.
//!
//! HTTP front end for the render pipeline:
//! - `POST /api/spectrogram` renders an uploaded clip
//! - `GET /api/image/:key` fetches a render stored for redirect delivery
//! - `GET /` serves the upload form

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index::index_handler))
        .route(
            "/api/spectrogram",
            post(handlers::spectrogram::spectrogram_handler),
        )
        .route("/api/image/:key", get(handlers::image::image_handler))
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
