//! IoT Dashboard CLI
//!
//! Command-line interface for the IoT device administration dashboard.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use iot_dashboard::mock::{self, MockBackend};
use iot_dashboard::{load_config, run, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "iot-dashboard")]
#[command(about = "Administrative web dashboard for IoT devices")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    port: Option<u16>,

    /// Backend base URL (overrides config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Start an in-process seeded backend and point the dashboard at it
    #[arg(long)]
    mock_backend: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, port={:?}, backend_url={:?}, mock_backend={}, log_level={:?}",
        args.config,
        args.port,
        args.backend_url,
        args.mock_backend,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(backend_url) = args.backend_url {
        config.backend.base_url = backend_url;
    }
    if args.mock_backend {
        let addr = mock::spawn(MockBackend::seeded(), SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        config.backend.base_url = format!("http://{}", addr);
    }

    tracing::info!("Starting IoT dashboard");
    run(config).await?;

    Ok(())
}
