//! Render request types.

use bytes::Bytes;

use crate::{SpectroError, SpectroResult, WindowFunction};

/// A single spectrogram request as received from a client.
///
/// Numeric fields are kept exactly as parsed so the validator can reject
/// out-of-range values; nothing downstream may use them before
/// [`crate::ParameterValidator::validate`] has returned true.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Raw uploaded audio, never decoded in-process
    pub data: Bytes,
    /// Image width in pixels (`-x`)
    pub x: i64,
    /// Image height in pixels (`-y`)
    pub y: i64,
    /// Dynamic range in dB (`-z`)
    pub z: i64,
    /// Title printed above the plot (`-t`)
    pub label: String,
    /// Window name as submitted
    pub window: String,
}

impl RenderRequest {
    pub fn new(data: impl Into<Bytes>, x: i64, y: i64, z: i64) -> Self {
        Self {
            data: data.into(),
            x,
            y,
            z,
            label: String::new(),
            window: WindowFunction::default().to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_window(mut self, window: impl Into<String>) -> Self {
        self.window = window.into();
        self
    }

    /// Convert a validated request into converter parameters.
    ///
    /// Fails with [`SpectroError::ValidationFailed`] if the window name is
    /// unknown or a dimension does not fit the converter's integer range.
    pub fn params(&self) -> SpectroResult<SpectrogramParams> {
        let window = self.window.parse::<WindowFunction>()?;
        let to_u32 = |v: i64| u32::try_from(v).map_err(|_| SpectroError::ValidationFailed);
        Ok(SpectrogramParams {
            width: to_u32(self.x)?,
            height: to_u32(self.y)?,
            dynamic_range: to_u32(self.z)?,
            label: self.label.clone(),
            window,
        })
    }
}

/// Visualization parameters handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrogramParams {
    pub width: u32,
    pub height: u32,
    pub dynamic_range: u32,
    pub label: String,
    pub window: WindowFunction,
}
