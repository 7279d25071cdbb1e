//! Fetching stored renders.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use spectro_common::SpectroError;
use tracing::{debug, instrument};

use super::{ApiError, IMAGE_CONTENT_TYPE};
use crate::metrics::record_image_fetch;
use crate::state::AppState;

/// GET /api/image/:key - Return a stored render, or 404 once it has expired
#[instrument(skip(state))]
pub async fn image_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    match state.cache.get(&key).await {
        Some(png) => {
            record_image_fetch(true);
            debug!(bytes = png.len(), "Serving stored image");
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)],
                png,
            )
                .into_response())
        }
        None => {
            record_image_fetch(false);
            Err(ApiError(SpectroError::NotFound(key)))
        }
    }
}
