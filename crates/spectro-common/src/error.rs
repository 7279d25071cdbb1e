//! Error types for the spectrogram services.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using SpectroError.
pub type SpectroResult<T> = Result<T, SpectroError>;

/// One of the standard streams of a converter process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeStream {
    Stdin,
    Stdout,
    Stderr,
}

impl fmt::Display for PipeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeStream::Stdin => write!(f, "stdin"),
            PipeStream::Stdout => write!(f, "stdout"),
            PipeStream::Stderr => write!(f, "stderr"),
        }
    }
}

/// Primary error type for spectrogram operations.
#[derive(Debug, Error)]
pub enum SpectroError {
    // === Client Errors ===
    #[error("Invalid request")]
    ValidationFailed,

    #[error("Image not found: {0}")]
    NotFound(String),

    // === Render Pipeline Errors ===
    #[error("Failed to start {program}: {message}")]
    ProcessStartFailed { program: String, message: String },

    #[error("Failed to acquire converter {stream} stream")]
    StreamAcquisitionFailed { stream: PipeStream },

    #[error("Failed to write audio to converter: {0}")]
    StreamWriteFailed(String),

    #[error("Failed to read converter output: {0}")]
    OutputReadFailed(String),

    #[error("{}", describe_exit(.code, .stderr))]
    ProcessFailed { code: Option<i32>, stderr: String },

    #[error("Converter exited successfully but produced no output")]
    EmptyOutput,

    #[error("Render timed out after {0:?}")]
    RenderTimeout(Duration),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

fn describe_exit(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exit status {}", code),
        None => "termination by signal".to_string(),
    };
    if stderr.is_empty() {
        format!("Converter failed with {}", status)
    } else {
        format!("Converter failed with {}: {}", status, stderr)
    }
}

impl SpectroError {
    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            SpectroError::ValidationFailed => "validation_failed",
            SpectroError::NotFound(_) => "not_found",
            SpectroError::ProcessStartFailed { .. } => "process_start_failed",
            SpectroError::StreamAcquisitionFailed { .. } => "stream_acquisition_failed",
            SpectroError::StreamWriteFailed(_) => "stream_write_failed",
            SpectroError::OutputReadFailed(_) => "output_read_failed",
            SpectroError::ProcessFailed { .. } => "process_failed",
            SpectroError::EmptyOutput => "empty_output",
            SpectroError::RenderTimeout(_) => "render_timeout",
            SpectroError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            SpectroError::ValidationFailed => 400,
            SpectroError::NotFound(_) => 404,
            SpectroError::RenderTimeout(_) => 504,
            _ => 500,
        }
    }

    /// Whether the caller, not the server, caused this error.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SpectroError::ValidationFailed.http_status_code(), 400);
        assert_eq!(SpectroError::NotFound("abc".into()).http_status_code(), 404);
        assert_eq!(SpectroError::RenderTimeout(Duration::from_secs(30)).http_status_code(), 504);
        assert_eq!(SpectroError::EmptyOutput.http_status_code(), 500);
        assert_eq!(
            SpectroError::StreamAcquisitionFailed {
                stream: PipeStream::Stdout
            }
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(SpectroError::ValidationFailed.is_client_error());
        assert!(!SpectroError::StreamWriteFailed("broken pipe".into()).is_client_error());
    }

    #[test]
    fn test_process_failed_message() {
        let err = SpectroError::ProcessFailed {
            code: Some(2),
            stderr: "sox FAIL formats: can't open input".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Converter failed with exit status 2: sox FAIL formats: can't open input"
        );

        let err = SpectroError::ProcessFailed {
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Converter failed with termination by signal");
    }

    #[test]
    fn test_timeout_message_keeps_subsecond_precision() {
        assert_eq!(
            SpectroError::RenderTimeout(Duration::from_millis(200)).to_string(),
            "Render timed out after 200ms"
        );
        assert_eq!(
            SpectroError::RenderTimeout(Duration::from_secs(120)).to_string(),
            "Render timed out after 120s"
        );
    }

    #[test]
    fn test_validation_message_matches_response_body() {
        assert_eq!(SpectroError::ValidationFailed.to_string(), "Invalid request");
    }
}
