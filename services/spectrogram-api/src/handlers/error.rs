//! Error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use spectro_common::SpectroError;

/// A [`SpectroError`] on its way out as an HTTP response.
///
/// - client errors carry only the fixed `Invalid request` message
/// - not-found is a bare status
/// - server errors carry the underlying message
#[derive(Debug)]
pub struct ApiError(pub SpectroError);

impl From<SpectroError> for ApiError {
    fn from(err: SpectroError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.0 {
            SpectroError::NotFound(_) => status.into_response(),
            SpectroError::ValidationFailed => (
                status,
                Json(json!({ "error": SpectroError::ValidationFailed.to_string() })),
            )
                .into_response(),
            err => (status, Json(json!({ "error": err.to_string() }))).into_response(),
        }
    }
}
