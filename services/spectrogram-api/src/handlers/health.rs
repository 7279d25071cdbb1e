//! Health check and Prometheus metrics endpoints.

use std::sync::Arc;

use axum::{extract::Extension, http::header, response::IntoResponse, Json};
use serde::Serialize;

use crate::config::DeliveryMode;
use crate::metrics::record_cache_gauges;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub renderer: String,
    pub delivery: DeliveryMode,
    pub window_selection: bool,
    pub cached_images: usize,
}

/// GET /health - Health check
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "spectrogram-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        renderer: state.renderer.name().to_string(),
        delivery: state.delivery,
        window_selection: state.window_selection(),
        cached_images: state.cache.len().await,
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    record_cache_gauges(&state.cache);
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
