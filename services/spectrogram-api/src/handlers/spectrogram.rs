//! Spectrogram upload handler.
//!
//! Flow: multipart form → [`RenderRequest`] → validation → renderer →
//! either the image inline or a redirect to the stored copy.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use spectro_common::{RenderRequest, SpectroError, SpectroResult, WindowFunction};
use tracing::{debug, error, info, instrument, warn};

use super::{ApiError, IMAGE_CONTENT_TYPE};
use crate::config::DeliveryMode;
use crate::metrics;
use crate::state::AppState;

/// Path prefix under which stored renders are served.
pub const IMAGE_ROUTE_PREFIX: &str = "/api/image/";

/// POST /api/spectrogram - Render an uploaded audio clip
#[instrument(skip_all)]
pub async fn spectrogram_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    metrics::record_request();

    let multipart = multipart.map_err(|e| {
        warn!(error = %e, "Rejected non-multipart upload");
        metrics::record_validation_failure();
        SpectroError::ValidationFailed
    })?;

    let mut request = read_upload(multipart).await.map_err(|e| {
        metrics::record_validation_failure();
        e
    })?;

    if !state.window_selection() {
        request.window = WindowFunction::Kaiser.to_string();
    }

    if !state.validator.validate(&request) {
        warn!(
            x = request.x,
            y = request.y,
            z = request.z,
            window = %request.window,
            audio_bytes = request.data.len(),
            "Invalid spectrogram request"
        );
        metrics::record_validation_failure();
        return Err(SpectroError::ValidationFailed.into());
    }

    let params = request.params()?;
    info!(
        width = params.width,
        height = params.height,
        dynamic_range = params.dynamic_range,
        window = %params.window,
        audio_bytes = request.data.len(),
        renderer = state.renderer.name(),
        "Rendering spectrogram"
    );

    let start = Instant::now();
    let png = state
        .renderer
        .render(request.data, &params)
        .await
        .map_err(|e| {
            error!(error = %e, kind = e.kind(), "Render failed");
            metrics::record_render_error(&e);
            e
        })?;
    metrics::record_render(start.elapsed(), png.len());

    Ok(deliver(&state, png).await)
}

async fn deliver(state: &AppState, png: Bytes) -> Response {
    match state.delivery {
        DeliveryMode::Inline => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)],
            png,
        )
            .into_response(),
        DeliveryMode::Redirect => {
            let key = state.cache.put(png).await;
            let location = format!("{}{}", IMAGE_ROUTE_PREFIX, key);
            debug!(location = %location, "Stored render, redirecting");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
    }
}

/// Collect the upload's form fields into a request.
///
/// Missing or unparseable numbers become 0, which validation rejects;
/// a missing `data` file is rejected here.
async fn read_upload(mut multipart: Multipart) -> SpectroResult<RenderRequest> {
    let mut data: Option<Bytes> = None;
    let mut request = RenderRequest::new(Bytes::new(), 0, 0, 0).with_window("");

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "data" => data = Some(field.bytes().await.map_err(invalid_form)?),
            "x" => request.x = parse_int(&field.text().await.map_err(invalid_form)?),
            "y" => request.y = parse_int(&field.text().await.map_err(invalid_form)?),
            "z" => request.z = parse_int(&field.text().await.map_err(invalid_form)?),
            "label" => request.label = field.text().await.map_err(invalid_form)?,
            "window" => request.window = field.text().await.map_err(invalid_form)?,
            other => debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    request.data = data.ok_or_else(|| {
        warn!("Upload has no data file");
        SpectroError::ValidationFailed
    })?;
    Ok(request)
}

fn invalid_form(e: axum::extract::multipart::MultipartError) -> SpectroError {
    warn!(error = %e, "Malformed multipart body");
    SpectroError::ValidationFailed
}

fn parse_int(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("3000"), 3000);
        assert_eq!(parse_int(" 500\r\n"), 500);
        assert_eq!(parse_int("-20"), -20);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("12px"), 0);
        assert_eq!(parse_int("99999999999999999999"), 0);
    }
}
