//! tmt-ha (Health Assessment) - Crop health assessment web service
//!
//! Serves the upload form, runs the leaf disease and soil suitability
//! classifiers and fuses their confidences into a crop health verdict.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tmt_common::config::ConfigResolver;
use tmt_ha::models::{ForestSuitabilityClassifier, RemoteDiseaseClassifier};
use tmt_ha::{build_router, AppState};

/// Command-line arguments for tmt-ha
#[derive(Parser, Debug)]
#[command(name = "tmt-ha")]
#[command(about = "Crop health assessment service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "TMT_HA_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(long, env = "TMT_HA_BIND")]
    bind: Option<String>,

    /// TensorFlow Serving base URL for the leaf disease model (overrides config)
    #[arg(long, env = "TMT_DISEASE_ENDPOINT")]
    disease_endpoint: Option<String>,

    /// Random forest JSON export for soil suitability (overrides config)
    #[arg(long, env = "TMT_SUITABILITY_MODEL")]
    suitability_model: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigResolver::new().with_cli_path(args.config.clone());
    let mut config = resolver.load().context("Failed to load configuration")?;

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(endpoint) = args.disease_endpoint {
        config.models.disease_endpoint = endpoint;
    }
    if let Some(path) = args.suitability_model {
        config.models.suitability_model = path;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    // Initialize tracing
    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tmt_ha={level},tmt_common={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting TomatoMato Health Assessment (tmt-ha) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration source: {:?}", resolver.resolve_path());

    // Load models once for the lifetime of the process
    let suitability = ForestSuitabilityClassifier::load(&config.models.suitability_model)
        .context("Failed to load suitability model")?;

    let disease = RemoteDiseaseClassifier::new(
        &config.models.disease_endpoint,
        &config.models.disease_model,
        Duration::from_secs(config.models.request_timeout_secs),
    )
    .context("Failed to initialize disease classifier")?;
    info!("Disease classifier: {}", disease.predict_url());

    let state = AppState::new(
        Arc::new(disease),
        Arc::new(suitability),
        config.max_upload_bytes,
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("tmt-ha listening on http://{}", addr);
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
            info!("Received SIGTERM, shutting down");
        },
    }
}
