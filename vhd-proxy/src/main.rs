//! vhd-proxy - pass-through service for the VHD classification backend
//!
//! Forwards `/api/health` and `/api/predict` to the backend at `VHD_API_URL`
//! and serves the bundled example recordings under `/sound`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vhd_common::config::{load_config, resolve_backend_url};
use vhd_proxy::{build_router, AppState, BackendClient};

/// Command-line arguments for vhd-proxy
#[derive(Parser, Debug)]
#[command(name = "vhd-proxy")]
#[command(about = "Pass-through proxy for the VHD heart-sound classification API")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "VHD_PROXY_PORT")]
    port: Option<u16>,

    /// Interface to bind (overrides config file)
    #[arg(long, env = "VHD_PROXY_BIND")]
    bind: Option<String>,

    /// Classification backend base URL (overrides VHD_API_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// Directory holding the example recordings (overrides config file)
    #[arg(long)]
    sound_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref());

    // Log level from config file unless RUST_LOG is set
    let default_level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vhd_proxy={0},vhd_common={0},tower_http={0}", default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting VHD proxy (vhd-proxy) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = config.context("Failed to load configuration")?;
    let backend_url = resolve_backend_url(args.backend_url.as_deref(), &config)
        .context("Invalid backend URL")?;
    let sound_dir = args.sound_dir.unwrap_or_else(|| config.sound_dir.clone());
    let port = args.port.unwrap_or(config.port);
    let bind = args.bind.unwrap_or_else(|| config.bind_address.clone());

    info!("Backend: {}", backend_url);
    info!("Example recordings: {}", sound_dir.display());
    if !sound_dir.is_dir() {
        tracing::warn!(
            "Sound directory {} does not exist; /sound requests will return 404",
            sound_dir.display()
        );
    }

    let timeout = config.request_timeout_secs.map(Duration::from_secs);
    let backend = BackendClient::new(backend_url, timeout).context("Failed to build HTTP client")?;

    let state = AppState::new(backend, sound_dir, config.max_upload_bytes);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("vhd-proxy listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
