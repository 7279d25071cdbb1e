//! `sox`-backed spectrogram renderer.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use spectro_common::{SpectroError, SpectroResult, SpectrogramParams};
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::process::ProcessRunner;
use crate::Renderer;

/// Default converter binary, resolved through `PATH`.
pub const DEFAULT_SOX_PROGRAM: &str = "sox";

/// Build the converter argument list for `params`.
///
/// Audio is read from stdin (`-`), mixed down to the first channel,
/// and the PNG is written to stdout (`-o -`); `-n` discards the audio
/// output itself.
pub fn sox_args(params: &SpectrogramParams) -> Vec<String> {
    vec![
        "-".to_string(),
        "-n".to_string(),
        "remix".to_string(),
        "1".to_string(),
        "spectrogram".to_string(),
        "-t".to_string(),
        params.label.clone(),
        "-x".to_string(),
        params.width.to_string(),
        "-y".to_string(),
        params.height.to_string(),
        "-z".to_string(),
        params.dynamic_range.to_string(),
        "-w".to_string(),
        params.window.to_string(),
        "-o".to_string(),
        "-".to_string(),
    ]
}

/// Renders spectrograms by piping audio through `sox`.
#[derive(Debug, Clone)]
pub struct SoxRenderer {
    runner: ProcessRunner,
}

impl Default for SoxRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_SOX_PROGRAM, None)
    }
}

impl SoxRenderer {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            runner: ProcessRunner::new(program).with_timeout(timeout),
        }
    }

    /// Use a preconfigured runner, e.g. one with wrapper arguments.
    pub fn from_runner(runner: ProcessRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    /// Ask the converter for its version string.
    ///
    /// Used at startup to report a missing or broken installation early;
    /// requests still spawn the converter individually.
    pub async fn version(&self) -> SpectroResult<String> {
        let program = self.runner.program().display().to_string();
        let mut command: Command = self.runner.command(["--version"]);
        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SpectroError::ProcessStartFailed {
                program: program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SpectroError::ProcessFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl Renderer for SoxRenderer {
    #[instrument(skip(self, audio), fields(audio_bytes = audio.len()))]
    async fn render(&self, audio: Bytes, params: &SpectrogramParams) -> SpectroResult<Bytes> {
        let args = sox_args(params);
        debug!(args = ?args, "Invoking converter");
        self.runner.run(args, audio).await
    }

    fn name(&self) -> &str {
        "sox"
    }
}
