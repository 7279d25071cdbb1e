//! End-to-end renders through a real sox installation.
//!
//! Skipped when `sox` is not on `PATH`.

use std::time::Duration;

use bytes::Bytes;
use renderer::{Renderer, SoxRenderer};
use spectro_common::{SpectroError, SpectrogramParams, WindowFunction};
use test_utils::{chirp_wav, require_program, silence_wav, sine_wav};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn params(window: WindowFunction) -> SpectrogramParams {
    SpectrogramParams {
        width: 300,
        height: 200,
        dynamic_range: 100,
        label: "tone".to_string(),
        window,
    }
}

#[tokio::test]
async fn test_renders_png() {
    let sox = require_program!("sox");
    let renderer = SoxRenderer::new(sox, Some(Duration::from_secs(60)));
    let png = renderer
        .render(Bytes::from(sine_wav(8000, 440.0, 1.0)), &params(WindowFunction::Kaiser))
        .await
        .unwrap();
    assert!(png.len() > PNG_SIGNATURE.len());
    assert_eq!(&png[..8], &PNG_SIGNATURE);
}

#[tokio::test]
async fn test_every_window_renders() {
    let sox = require_program!("sox");
    let renderer = SoxRenderer::new(sox, None);
    let audio = Bytes::from(chirp_wav(8000, 200.0, 3000.0, 0.25));
    for window in WindowFunction::ALL {
        let png = renderer.render(audio.clone(), &params(window)).await.unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE, "window={}", window);
    }
}

#[tokio::test]
async fn test_silence_still_renders() {
    let sox = require_program!("sox");
    let renderer = SoxRenderer::new(sox, None);
    let png = renderer
        .render(Bytes::from(silence_wav(8000, 0.5)), &params(WindowFunction::Hann))
        .await
        .unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);
}

#[tokio::test]
async fn test_garbage_input_rejected_by_converter() {
    let sox = require_program!("sox");
    let renderer = SoxRenderer::new(sox, None);
    let err = renderer
        .render(Bytes::from_static(b"definitely not audio"), &params(WindowFunction::Hann))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            SpectroError::ProcessFailed { .. } | SpectroError::StreamWriteFailed(_)
        ),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_version_probe() {
    let sox = require_program!("sox");
    let version = SoxRenderer::new(sox, None).version().await.unwrap();
    assert!(version.to_lowercase().contains("sox"));
}
