//! Storage abstractions for the spectrogram services.
//!
//! Provides:
//! - [`ArtifactCache`], a pure time-to-live store holding rendered
//!   images between the upload request and the follow-up fetch
//! - [`Clock`] implementations so expiry can be tested without sleeping

pub mod artifact_cache;
pub mod clock;

pub use artifact_cache::{ArtifactCache, ArtifactCacheConfig, ArtifactCacheStats};
pub use clock::{Clock, ManualClock, SystemClock};
