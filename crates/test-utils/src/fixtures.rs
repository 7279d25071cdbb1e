//! Common test fixtures: requests, parameters and fake renderers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use renderer::Renderer;
use spectro_common::{SpectroError, SpectroResult, SpectrogramParams, WindowFunction};

use crate::generators::fake_png;

/// Parameters matching the upload form's defaults.
pub fn default_params() -> SpectrogramParams {
    SpectrogramParams {
        width: 3000,
        height: 500,
        dynamic_range: 100,
        label: String::new(),
        window: WindowFunction::Kaiser,
    }
}

/// What a [`FakeRenderer`] does when called.
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    /// Return these bytes
    Image(Bytes),
    /// Fail with [`SpectroError::ProcessFailed`]
    ExitCode(i32),
    /// Fail with [`SpectroError::ProcessStartFailed`]
    StartFailure,
    /// Sleep, then return the image
    Slow(Duration, Bytes),
}

/// Renderer returning canned results and recording what it was asked.
#[derive(Debug)]
pub struct FakeRenderer {
    outcome: FakeOutcome,
    calls: AtomicUsize,
    last: Mutex<Option<(Bytes, SpectrogramParams)>>,
}

impl FakeRenderer {
    pub fn new(outcome: FakeOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// Always succeeds with a small PNG-looking payload.
    pub fn image() -> Self {
        Self::new(FakeOutcome::Image(Bytes::from(fake_png(64))))
    }

    /// Always fails as if the converter exited with `code`.
    pub fn failing(code: i32) -> Self {
        Self::new(FakeOutcome::ExitCode(code))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Audio and parameters of the most recent call.
    pub fn last_call(&self) -> Option<(Bytes, SpectrogramParams)> {
        self.last
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, audio: Bytes, params: &SpectrogramParams) -> SpectroResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some((audio, params.clone()));

        match &self.outcome {
            FakeOutcome::Image(png) => Ok(png.clone()),
            FakeOutcome::ExitCode(code) => Err(SpectroError::ProcessFailed {
                code: Some(*code),
                stderr: "fake converter failure".to_string(),
            }),
            FakeOutcome::StartFailure => Err(SpectroError::ProcessStartFailed {
                program: "fake".to_string(),
                message: "No such file or directory (os error 2)".to_string(),
            }),
            FakeOutcome::Slow(delay, png) => {
                tokio::time::sleep(*delay).await;
                Ok(png.clone())
            }
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}
