// =============================================================================
// IDX Stock Analysis Service: Main Entry Point
// =============================================================================
//
// Loads configuration, wires the upstream data providers (cached when
// enabled) and serves the analysis API until Ctrl-C.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use idx_analysis::api;
use idx_analysis::app_state::AppState;
use idx_analysis::config::{startup_log_filter, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    let env_lookup = |key: &str| std::env::var(key).ok();
    let (filter, filter_handle) =
        reload::Layer::new(EnvFilter::new(startup_log_filter(env_lookup)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // ── 2. Config ────────────────────────────────────────────────────────
    let config_path =
        std::env::var("APP_CONFIG").unwrap_or_else(|_| "app_config.json".to_string());
    let config = AppConfig::from_env(&config_path);

    // RUST_LOG wins; otherwise the loaded `log_level` replaces the startup filter.
    if env_lookup("RUST_LOG").is_none() {
        if let Err(e) = filter_handle.modify(|f| *f = EnvFilter::new(config.log_level.as_str())) {
            warn!(error = %e, "failed to apply configured log level");
        }
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        app_env = %config.app_env,
        "stock analysis service starting"
    );

    if let Err(e) = config.validate() {
        warn!(error = %e, "configuration incomplete; data endpoints will answer 503");
    }

    // ── 3. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr();
    let state = Arc::new(AppState::from_config(config)?);

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("stock analysis service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
