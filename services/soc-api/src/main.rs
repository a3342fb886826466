//! SOC API Server
//!
//! Serves soil organic carbon values and statistics from a directory of
//! georeferenced raster tiles.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use projection::Proj4Transformer;
use soc_common::Crs;
use tile_index::{MeanPolicy, SocService};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use soc_api::config::{self, Overrides};
use soc_api::state::AppState;

/// SOC API Server
#[derive(Parser, Debug)]
#[command(name = "soc-api")]
#[command(about = "Soil organic carbon point query server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "SOC_LISTEN_ADDR")]
    listen: String,

    /// Directory containing raster tiles
    #[arg(short, long, env = "SOC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// CRS of query coordinates, e.g. EPSG:4326
    #[arg(long, env = "SOC_REFERENCE_CRS")]
    reference_crs: Option<Crs>,

    /// Global mean policy: all-tiles, contributing-tiles or pixel-weighted
    #[arg(long, env = "SOC_MEAN_POLICY")]
    mean_policy: Option<MeanPolicy>,

    /// YAML configuration file
    #[arg(short, long, env = "SOC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "SOC_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("failed to create Tokio runtime")?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    info!("Starting SOC API server");

    let overrides = Overrides {
        data_dir: args.data_dir,
        reference_crs: args.reference_crs,
        mean_policy: args.mean_policy,
    };
    let service_config = config::resolve(args.config.as_deref(), overrides)?;

    // Decoding tiles is blocking file I/O
    let service = tokio::task::spawn_blocking(move || {
        SocService::start(&service_config, Arc::new(Proj4Transformer::new()))
    })
    .await
    .context("tile loading task panicked")??;

    let state = Arc::new(AppState::new(service).with_prometheus(prometheus_handle));
    let app = soc_api::build_router(Arc::clone(&state));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("invalid listen address: {}", args.listen))?;

    info!("SOC API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    match Arc::try_unwrap(state) {
        Ok(state) => {
            let closed = state.shutdown();
            info!(closed, "Closed all tiles");
        }
        Err(_) => warn!("Application state still shared after shutdown; tiles released on drop"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Received shutdown signal");
}
