//! Spectrogram rendering.
//!
//! Rendering is delegated to an external converter (`sox`) fed through
//! anonymous pipes:
//! - [`process`] owns one converter invocation: spawn, stream, drain, wait
//! - [`sox`] maps spectrogram parameters onto the converter's flags
//!
//! Handlers depend on the [`Renderer`] trait so tests can substitute
//! fakes without installing the converter.

pub mod process;
pub mod sox;

use async_trait::async_trait;
use bytes::Bytes;
use spectro_common::{SpectroResult, SpectrogramParams};

pub use process::{ChildStreams, ProcessRunner};
pub use sox::{sox_args, SoxRenderer};

/// Something that turns raw audio into a spectrogram image.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `audio` once. Implementations never retry.
    async fn render(&self, audio: Bytes, params: &SpectrogramParams) -> SpectroResult<Bytes>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
