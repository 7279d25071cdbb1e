//! Spectrogram API server.
//!
//! Accepts audio uploads and renders spectrograms by piping them through sox.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use renderer::SoxRenderer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use spectrogram_api::config::ServiceConfig;
use spectrogram_api::state::AppState;

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = ServiceConfig::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = config.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;
    runtime.block_on(run_server(config))
}

async fn run_server(config: ServiceConfig) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!(
        listen = %config.listen,
        sox = %config.sox_path.display(),
        delivery = ?config.delivery,
        window_selection = config.window_selection,
        cache_ttl_secs = config.cache_ttl_secs,
        render_timeout_secs = config.render_timeout_secs,
        "Starting spectrogram API server"
    );

    // Report a missing converter now rather than on the first upload
    match SoxRenderer::new(config.sox_path.clone(), None).version().await {
        Ok(version) => info!(version = %version, "Converter available"),
        Err(e) => warn!(error = %e, "Converter check failed; renders will fail until it is installed"),
    }

    let state = Arc::new(AppState::from_config(&config, Some(prometheus_handle)));
    let app = spectrogram_api::build_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    state.cache.close().await;
    info!("Spectrogram API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
