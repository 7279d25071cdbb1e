//! Common types and utilities shared across the spectrogram services.

pub mod error;
pub mod request;
pub mod validation;
pub mod window;

pub use error::{SpectroError, SpectroResult};
pub use request::{RenderRequest, SpectrogramParams};
pub use validation::{Bounds, ParameterValidator};
pub use window::WindowFunction;
