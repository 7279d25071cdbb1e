//! Prometheus metric names and recording helpers.

use std::time::Duration;

use metrics::{counter, gauge, histogram};
use spectro_common::SpectroError;
use storage::ArtifactCache;

pub const REQUESTS_TOTAL: &str = "spectrogram_requests_total";
pub const VALIDATION_FAILURES_TOTAL: &str = "spectrogram_validation_failures_total";
pub const RENDER_ERRORS_TOTAL: &str = "spectrogram_render_errors_total";
pub const RENDER_DURATION_SECONDS: &str = "spectrogram_render_duration_seconds";
pub const RENDER_OUTPUT_BYTES: &str = "spectrogram_render_output_bytes";
pub const IMAGE_FETCHES_TOTAL: &str = "spectrogram_image_fetches_total";
pub const CACHE_ENTRIES: &str = "spectrogram_cache_entries";
pub const CACHE_BYTES: &str = "spectrogram_cache_bytes";

pub fn record_request() {
    counter!(REQUESTS_TOTAL).increment(1);
}

pub fn record_validation_failure() {
    counter!(VALIDATION_FAILURES_TOTAL).increment(1);
}

pub fn record_render(elapsed: Duration, output_bytes: usize) {
    histogram!(RENDER_DURATION_SECONDS).record(elapsed.as_secs_f64());
    histogram!(RENDER_OUTPUT_BYTES).record(output_bytes as f64);
}

pub fn record_render_error(error: &SpectroError) {
    counter!(RENDER_ERRORS_TOTAL, "kind" => error.kind()).increment(1);
}

pub fn record_image_fetch(found: bool) {
    let outcome = if found { "hit" } else { "miss" };
    counter!(IMAGE_FETCHES_TOTAL, "outcome" => outcome).increment(1);
}

/// Publish cache gauges; called before rendering the exposition text.
pub fn record_cache_gauges(cache: &ArtifactCache) {
    use std::sync::atomic::Ordering;

    let stats = cache.stats();
    gauge!(CACHE_ENTRIES).set(stats.entry_count.load(Ordering::Relaxed) as f64);
    gauge!(CACHE_BYTES).set(stats.size_bytes.load(Ordering::Relaxed) as f64);
}
