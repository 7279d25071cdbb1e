//! Converter process lifecycle.
//!
//! One [`ProcessRunner::run`] call is one converter invocation:
//!
//! 1. spawn with stdin/stdout/stderr wired to anonymous pipes
//! 2. take ownership of the three pipe handles
//! 3. write the whole input, then close stdin so the converter sees EOF
//! 4. drain stdout while the write is still in progress; stderr is
//!    drained on a separate task for the whole run
//! 5. wait for exit and classify the status
//!
//! Steps 3 and 4 are driven together. A streaming converter starts
//! emitting output before it has consumed all input, and once its stdout
//! pipe fills it stops reading stdin; writing everything first would then
//! deadlock on any input larger than the OS pipe buffer.
//!
//! The child is spawned with `kill_on_drop`, and every error path kills
//! and reaps it before returning.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use bytes::Bytes;
use spectro_common::error::PipeStream;
use spectro_common::{SpectroError, SpectroResult};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Upper bound on converter diagnostics carried in an error message.
const MAX_STDERR_BYTES: usize = 4096;

/// How long to wait for stderr after killing a converter.
const STDERR_GRACE: Duration = Duration::from_secs(1);

/// Pipe handles taken from a freshly spawned child.
#[derive(Debug)]
pub struct ChildStreams {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: Option<ChildStderr>,
}

impl ChildStreams {
    /// Take the stdin writer and stdout reader from `child`.
    ///
    /// Each missing handle is reported separately. stderr is optional:
    /// diagnostics are nice to have, not required for a render.
    pub fn acquire(child: &mut Child) -> SpectroResult<Self> {
        let stdin = child.stdin.take().ok_or(SpectroError::StreamAcquisitionFailed {
            stream: PipeStream::Stdin,
        })?;
        let stdout = child.stdout.take().ok_or(SpectroError::StreamAcquisitionFailed {
            stream: PipeStream::Stdout,
        })?;
        Ok(Self {
            stdin,
            stdout,
            stderr: child.stderr.take(),
        })
    }
}

/// Runs a converter program once per call, feeding it bytes and
/// collecting what it writes to stdout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    leading_args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: None,
        }
    }

    /// Arguments placed before every invocation's own arguments, for
    /// wrappers such as `nice -n 10 sox` or an interpreter running a script.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kill the converter if a single run takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Build the command for `args` with all three streams piped.
    pub fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(args.into_iter().map(Into::into))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Run the program with `args`, streaming `input` to it.
    pub async fn run<I, S>(&self, args: I, input: Bytes) -> SpectroResult<Bytes>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.execute(self.command(args), input).await
    }

    /// Run an already configured command.
    ///
    /// The command's stdio settings are used as given, so a command built
    /// without piped stdin or stdout fails with
    /// [`SpectroError::StreamAcquisitionFailed`].
    pub async fn execute(&self, mut command: Command, input: Bytes) -> SpectroResult<Bytes> {
        let program = self.program.display().to_string();

        let mut child = command.spawn().map_err(|e| {
            error!(program = %program, error = %e, "Error while starting converter");
            SpectroError::ProcessStartFailed {
                program: program.clone(),
                message: e.to_string(),
            }
        })?;
        debug!(program = %program, pid = ?child.id(), input_bytes = input.len(), "Converter started");

        let ChildStreams {
            stdin,
            stdout,
            stderr,
        } = match ChildStreams::acquire(&mut child) {
            Ok(streams) => streams,
            Err(e) => {
                error!(program = %program, error = %e, "Converter stream unavailable");
                terminate(&mut child).await;
                return Err(e);
            }
        };

        // Own task, so diagnostics are still collected when the exchange
        // below is cut short
        let diagnostics = tokio::spawn(drain_optional(stderr));

        let exchanged = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, exchange(&mut child, stdin, stdout, input)).await {
                    Ok(result) => result,
                    Err(_) => Err(SpectroError::RenderTimeout(limit)),
                }
            }
            None => exchange(&mut child, stdin, stdout, input).await,
        };

        match exchanged {
            Ok((status, output)) => {
                let raw = diagnostics.await.map_err(|e| {
                    SpectroError::InternalError(format!("Converter stderr task failed: {}", e))
                })??;
                classify(&program, status, output, raw)
            }
            Err(e) => {
                terminate(&mut child).await;
                let stderr = abandoned_diagnostics(diagnostics).await;
                error!(program = %program, error = %e, stderr = %stderr, "Converter I/O failed");
                Err(with_diagnostics(e, stderr))
            }
        }
    }
}

/// Feed stdin while draining stdout, then wait for exit.
async fn exchange(
    child: &mut Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    input: Bytes,
) -> SpectroResult<(ExitStatus, Vec<u8>)> {
    let (_, output) = tokio::try_join!(
        write_input(stdin, input),
        drain(stdout, PipeStream::Stdout),
    )?;

    let status = child
        .wait()
        .await
        .map_err(|e| SpectroError::InternalError(format!("Failed to wait for converter: {}", e)))?;

    Ok((status, output))
}

async fn write_input(mut stdin: ChildStdin, input: Bytes) -> SpectroResult<()> {
    stdin
        .write_all(&input)
        .await
        .map_err(|e| SpectroError::StreamWriteFailed(e.to_string()))?;
    stdin
        .flush()
        .await
        .map_err(|e| SpectroError::StreamWriteFailed(e.to_string()))?;
    // Dropping the handle closes the pipe: EOF for the converter.
    drop(stdin);
    Ok(())
}

async fn drain<R: AsyncRead + Unpin>(mut reader: R, stream: PipeStream) -> SpectroResult<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|e| SpectroError::OutputReadFailed(format!("{}: {}", stream, e)))?;
    Ok(buf)
}

async fn drain_optional(stderr: Option<ChildStderr>) -> SpectroResult<Vec<u8>> {
    match stderr {
        Some(stderr) => drain(stderr, PipeStream::Stderr).await,
        None => Ok(Vec::new()),
    }
}

/// Stderr captured from a converter that has already been killed.
///
/// Gives up after [`STDERR_GRACE`] in case a grandchild still holds the
/// pipe open.
async fn abandoned_diagnostics(mut handle: JoinHandle<SpectroResult<Vec<u8>>>) -> String {
    match tokio::time::timeout(STDERR_GRACE, &mut handle).await {
        Ok(Ok(Ok(raw))) => summarize_stderr(&raw),
        Ok(_) => String::new(),
        Err(_) => {
            handle.abort();
            String::new()
        }
    }
}

/// A converter that stops reading usually says why on stderr.
fn with_diagnostics(err: SpectroError, stderr: String) -> SpectroError {
    match err {
        SpectroError::StreamWriteFailed(message) if !stderr.is_empty() => {
            SpectroError::StreamWriteFailed(format!("{} (converter stderr: {})", message, stderr))
        }
        other => other,
    }
}

fn classify(
    program: &str,
    status: ExitStatus,
    output: Vec<u8>,
    diagnostics: Vec<u8>,
) -> SpectroResult<Bytes> {
    let stderr = summarize_stderr(&diagnostics);

    if !status.success() {
        error!(
            program = %program,
            exit_code = ?status.code(),
            discarded_bytes = output.len(),
            stderr = %stderr,
            "Converter exited with failure"
        );
        return Err(SpectroError::ProcessFailed {
            code: status.code(),
            stderr,
        });
    }

    if !stderr.is_empty() {
        warn!(program = %program, stderr = %stderr, "Converter reported warnings");
    }

    if output.is_empty() {
        error!(program = %program, "Converter exited cleanly without output");
        return Err(SpectroError::EmptyOutput);
    }

    info!(
        program = %program,
        exit_code = ?status.code(),
        output_bytes = output.len(),
        "Executed converter"
    );
    Ok(Bytes::from(output))
}

/// Trimmed, length-capped stderr text.
fn summarize_stderr(raw: &[u8]) -> String {
    let start = raw.len().saturating_sub(MAX_STDERR_BYTES);
    String::from_utf8_lossy(&raw[start..]).trim().to_string()
}

/// Kill the child if still running and reap it.
async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "Failed to kill converter");
    }
}
