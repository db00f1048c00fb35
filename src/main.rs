//! EdgeGuard Server: session-backed auth edge
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{EnvFilter, fmt};

use edgeguard_cache::provider::CacheManager;
use edgeguard_core::config::{AppConfig, LogFormat};
use edgeguard_core::error::AppError;
use edgeguard_core::traits::{Clock, SystemClock};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("EDGEGUARD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let with_target = config.logging.target;

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(with_target)
                .with_current_span(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(with_target)
                .init();
        }
    }
}

/// Install the Prometheus exporter. Failures are logged, never fatal.
fn init_metrics(config: &AppConfig) {
    if !config.metrics.enabled {
        tracing::info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match config.metrics.listen_address.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(
                listen_address = %config.metrics.listen_address,
                error = %e,
                "Invalid metrics listen address; exporter not started"
            );
            return;
        }
    };

    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!("Metrics exporter listening on {}", addr),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EdgeGuard v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Metrics ──────────────────────────────────────────
    init_metrics(&config);

    // ── Step 2: Initialize cache ─────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {})...",
        config.cache.provider
    );
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = Arc::new(CacheManager::new(&config.cache, Arc::clone(&clock)).await?);
    tracing::info!("Cache initialized");

    // ── Step 3: Wire state and build the edge ────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = edgeguard_api::AppState::new(config, cache, clock)?;
    if let Some(upstream) = &state.upstream {
        tracing::info!("Forwarding unmatched routes to {}", upstream.base_url());
    }
    let app = edgeguard_api::build_app(state);

    // ── Step 4: Bind and serve ───────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("EdgeGuard listening on {}", addr);

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let server = tokio::spawn(async move { server.await });
    let mut server = server;
    tokio::select! {
        result = &mut server => {
            result
                .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!("Graceful shutdown exceeded {}s; aborting", grace.as_secs());
            server.abort();
        }
    }

    tracing::info!("EdgeGuard server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
