//! HTTP request handlers.
//!
//! - `spectrogram`: upload parsing, validation, rendering and delivery
//! - `image`: fetch of stored renders
//! - `index`: the HTML upload form
//! - `health`: liveness and Prometheus metrics
//! - `error`: mapping of pipeline errors onto HTTP responses

pub mod error;
pub mod health;
pub mod image;
pub mod index;
pub mod spectrogram;

pub use error::ApiError;

/// Content type of every rendered image.
pub const IMAGE_CONTENT_TYPE: &str = "image/png";
