//! aiev-hv (Human Validation) - review service for AI image ratings
//!
//! Runs the AI evaluation, then lets a reviewer agree or disagree with each
//! rating, override disagreed ratings and submit the review for analysis.

use std::env;
use std::sync::Arc;

use aiev_common::config::{write_toml_config, ConfigResolver};
use aiev_common::events::EventBus;
use aiev_common::DemoEvaluator;
use aiev_hv::config::{Args, ServiceConfig, MODULE_NAME};
use aiev_hv::{build_router, AppState, ReviewSettings};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise start from --log-level and refine once TOML is loaded
    let rust_log_set = env::var_os("RUST_LOG").is_some();
    let initial_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(args.log_level.as_deref().unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, filter_handle) = reload::Layer::new(initial_filter);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting AIEV Human Validation (aiev-hv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let resolver = ConfigResolver::new(MODULE_NAME);
    let toml_config = resolver.load(args.config.as_deref());
    let config = ServiceConfig::resolve(&args, &toml_config);

    if !rust_log_set && args.log_level.is_none() {
        match EnvFilter::try_new(&config.log_level) {
            Ok(filter) => {
                if let Err(e) = filter_handle.reload(filter) {
                    warn!("Failed to apply log level from config: {}", e);
                }
            }
            Err(e) => warn!(level = %config.log_level, "Invalid log level in config: {}", e),
        }
    }

    if args.init_config {
        let path = args
            .config
            .clone()
            .or_else(|| resolver.config_file_path())
            .context("No config directory available; pass --config")?;
        write_toml_config(&config.to_toml(), &path)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    info!(
        policy = ?config.policy,
        agreement_threshold = config.agreement_threshold,
        event_capacity = config.event_capacity,
        "Review settings resolved"
    );

    let settings = ReviewSettings {
        policy: config.policy,
        agreement_threshold: config.agreement_threshold,
    };
    let state = AppState::new(
        Arc::new(DemoEvaluator),
        EventBus::new(config.event_capacity),
        settings,
    );
    let app = build_router(state);

    let addr = config.socket_addr().context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("aiev-hv listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
