//! Application state shared by all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use renderer::{Renderer, SoxRenderer};
use spectro_common::ParameterValidator;
use storage::ArtifactCache;

use crate::config::{DeliveryMode, ServiceConfig};

/// Shared application state.
pub struct AppState {
    /// Turns audio into images.
    pub renderer: Arc<dyn Renderer>,

    /// Holds renders between the upload and the redirected fetch.
    pub cache: Arc<ArtifactCache>,

    /// Request bounds checks.
    pub validator: ParameterValidator,

    /// Inline image or store-then-redirect.
    pub delivery: DeliveryMode,

    /// Largest accepted request body.
    pub max_upload_bytes: usize,

    /// Prometheus exporter, when one is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state for `config` with a sox renderer and a sweeping cache.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn from_config(config: &ServiceConfig, prometheus: Option<PrometheusHandle>) -> Self {
        let renderer = SoxRenderer::new(config.sox_path.clone(), config.render_timeout());
        let cache = ArtifactCache::from_config(&config.cache_config());

        Self {
            renderer: Arc::new(renderer),
            cache: Arc::new(cache),
            validator: ParameterValidator::new(config.window_selection),
            delivery: config.delivery,
            max_upload_bytes: config.max_upload_bytes(),
            prometheus,
        }
    }

    /// State with explicit collaborators, used by tests and embedders.
    pub fn new(renderer: Arc<dyn Renderer>, cache: Arc<ArtifactCache>, delivery: DeliveryMode) -> Self {
        Self {
            renderer,
            cache,
            validator: ParameterValidator::default(),
            delivery,
            max_upload_bytes: 256 * 1024 * 1024,
            prometheus: None,
        }
    }

    /// Enable or disable client window selection.
    pub fn with_window_selection(mut self, enabled: bool) -> Self {
        self.validator = ParameterValidator::new(enabled);
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn window_selection(&self) -> bool {
        self.validator.checks_window()
    }
}
