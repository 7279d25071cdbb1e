//! Service configuration from command-line flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use storage::ArtifactCacheConfig;

/// How a successful render reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Store the image and answer `302 Found` pointing at `/api/image/{key}`
    Redirect,
    /// Answer `200 OK` with the image body
    Inline,
}

/// Spectrogram API server
#[derive(Parser, Debug, Clone)]
#[command(name = "spectrogram-api")]
#[command(about = "Renders uploaded audio into spectrogram images using sox")]
pub struct ServiceConfig {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "localhost:3000", env = "API_ADDR")]
    pub listen: String,

    /// Converter binary
    #[arg(long, default_value = "sox", env = "SOX_PATH")]
    pub sox_path: PathBuf,

    /// Response style for successful renders
    #[arg(long, value_enum, default_value_t = DeliveryMode::Redirect, env = "DELIVERY_MODE")]
    pub delivery: DeliveryMode,

    /// Let clients choose the window function; when false every render uses Kaiser
    #[arg(long, default_value_t = true, action = ArgAction::Set, env = "WINDOW_SELECTION")]
    pub window_selection: bool,

    /// Lifetime of stored images in seconds
    #[arg(long, default_value_t = 300, env = "CACHE_TTL_SECS")]
    pub cache_ttl_secs: u64,

    /// Interval between sweeps of expired images in seconds (0 disables sweeping)
    #[arg(long, default_value_t = 60, env = "CACHE_SWEEP_INTERVAL_SECS")]
    pub cache_sweep_interval_secs: u64,

    /// Kill a render after this many seconds (0 disables the limit)
    #[arg(long, default_value_t = 120, env = "RENDER_TIMEOUT_SECS")]
    pub render_timeout_secs: u64,

    /// Maximum upload size in MiB
    #[arg(long, default_value_t = 256, env = "MAX_UPLOAD_MB")]
    pub max_upload_mb: usize,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long, env = "WORKER_THREADS")]
    pub worker_threads: Option<usize>,
}

impl ServiceConfig {
    pub fn cache_config(&self) -> ArtifactCacheConfig {
        ArtifactCacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            sweep_interval: match self.cache_sweep_interval_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    pub fn render_timeout(&self) -> Option<Duration> {
        match self.render_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServiceConfig {
        let mut argv = vec!["spectrogram-api"];
        argv.extend_from_slice(args);
        ServiceConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_explicit_defaults() {
        let config = parse(&[
            "--listen",
            "localhost:3000",
            "--sox-path",
            "sox",
            "--delivery",
            "redirect",
            "--cache-ttl-secs",
            "300",
            "--render-timeout-secs",
            "120",
            "--max-upload-mb",
            "256",
        ]);
        assert_eq!(config.listen, "localhost:3000");
        assert_eq!(config.delivery, DeliveryMode::Redirect);
        assert_eq!(config.cache_config().ttl, Duration::from_secs(300));
        assert_eq!(config.render_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.max_upload_bytes(), 256 * 1024 * 1024);
    }

    #[test]
    fn test_zero_disables_timeout_and_sweeper() {
        let config = parse(&["--render-timeout-secs", "0", "--cache-sweep-interval-secs", "0"]);
        assert_eq!(config.render_timeout(), None);
        assert_eq!(config.cache_config().sweep_interval, None);
    }

    #[test]
    fn test_fixed_window_variant() {
        let config = parse(&["--window-selection", "false", "--delivery", "inline"]);
        assert!(!config.window_selection);
        assert_eq!(config.delivery, DeliveryMode::Inline);
    }

    #[test]
    fn test_rejects_unknown_delivery() {
        let result = ServiceConfig::try_parse_from(["spectrogram-api", "--delivery", "email"]);
        assert!(result.is_err());
    }
}
