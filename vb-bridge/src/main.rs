//! vb-bridge - Vision API relay service
//!
//! Serves a small web UI and relays uploaded images to Azure Computer Vision:
//! feature analysis (single call) and OCR (submit, then poll).
//!
//! Default port: 5730

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vb_common::config::{AzureCredentials, ConfigSource, PollPolicy, TomlConfig};

use vb_bridge::services::build_http_client;
use vb_bridge::{build_router, AppState};

/// Command-line arguments for vb-bridge
#[derive(Parser, Debug)]
#[command(name = "vb-bridge")]
#[command(about = "Relay image uploads to the Azure Computer Vision API")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "VB_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides `bind` in the config file)
    #[arg(short, long, env = "VB_BIND")]
    bind: Option<String>,

    /// Delay between OCR status checks, in milliseconds
    #[arg(long, env = "VB_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Maximum number of OCR status checks
    #[arg(long, env = "VB_MAX_POLL_ATTEMPTS")]
    max_poll_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so its log level can apply
    let (mut toml_config, config_source) = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Vision Bridge (vb-bridge) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_source {
        ConfigSource::File(path) => info!("Configuration: {}", path.display()),
        ConfigSource::ExplicitMissing(path) => warn!(
            "Config file {} not found, using environment and defaults",
            path.display()
        ),
        ConfigSource::Defaults => warn!("No config file found, using environment and defaults"),
    }

    if args.poll_interval_ms.is_some() {
        toml_config.ocr.poll_interval_ms = args.poll_interval_ms;
    }
    if args.max_poll_attempts.is_some() {
        toml_config.ocr.max_poll_attempts = args.max_poll_attempts;
    }
    let poll_policy =
        PollPolicy::from_section(&toml_config.ocr).context("Invalid OCR polling configuration")?;
    info!(
        interval_ms = poll_policy.interval.as_millis() as u64,
        max_attempts = poll_policy.max_attempts,
        "OCR polling policy"
    );

    // Missing credentials are reported per request, not at startup
    let credentials = match AzureCredentials::resolve(&toml_config.azure) {
        Ok(creds) => {
            info!("Vision endpoint: {}", creds.endpoint());
            Some(creds)
        }
        Err(e) => {
            warn!("{}; analysis requests will fail until configured", e);
            None
        }
    };

    let http_client = build_http_client().context("Failed to build HTTP client")?;
    let state = AppState::new(http_client, credentials, poll_policy);
    let app = build_router(state);

    let bind = args
        .bind
        .as_deref()
        .unwrap_or_else(|| toml_config.bind_addr());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", bind))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
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
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
