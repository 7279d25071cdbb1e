//! Drives `SoxRenderer` end to end against stand-in converter scripts.

use std::time::Duration;

use bytes::Bytes;
use renderer::{sox_args, Renderer};
use spectro_common::{SpectroError, WindowFunction};
use test_utils::{default_params, filler_bytes, FakeConverter};

#[tokio::test]
async fn test_renderer_passes_arguments_positionally() {
    let fake = FakeConverter::print_args().unwrap();
    let renderer = fake.renderer(None);

    let mut params = default_params();
    params.label = "two words".to_string();
    params.window = WindowFunction::Bartlett;

    let output = renderer
        .render(Bytes::from_static(b"audio"), &params)
        .await
        .unwrap();
    let printed: Vec<String> = String::from_utf8(output.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();

    assert_eq!(printed, sox_args(&params));
}

#[tokio::test]
async fn test_renderer_streams_large_audio() {
    let fake = FakeConverter::echo().unwrap();
    let renderer = fake.renderer(Some(Duration::from_secs(30)));
    let audio = Bytes::from(filler_bytes(5 * 1024 * 1024));

    let output = renderer.render(audio.clone(), &default_params()).await.unwrap();
    assert_eq!(output, audio);
}

#[tokio::test]
async fn test_renderer_reports_converter_failure() {
    let fake = FakeConverter::new("cat >/dev/null\necho 'sox FAIL spectrogram: bad window' >&2\nexit 1").unwrap();
    let renderer = fake.renderer(None);

    let err = renderer
        .render(Bytes::from_static(b"audio"), &default_params())
        .await
        .unwrap_err();
    match err {
        SpectroError::ProcessFailed { code, stderr } => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("bad window"));
        }
        other => panic!("expected ProcessFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_version_probe_through_wrapper() {
    let fake = FakeConverter::new("echo \"fake-sox: SoX v14.4.2\"").unwrap();
    let version = fake.renderer(None).version().await.unwrap();
    assert_eq!(version, "fake-sox: SoX v14.4.2");
}
