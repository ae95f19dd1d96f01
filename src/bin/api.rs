//! Jocarsa Suite Module Server
//!
//! Run with: cargo run --bin jocarsa-suite-api
//!
//! # Configuration
//!
//! Settings come from the config file (see `jocarsa-suite-cli config`),
//! then environment variables, then command-line flags:
//! - `JOCARSA_HOST`: Host to bind to (default: 127.0.0.1)
//! - `JOCARSA_PORT`: Port to listen on (default: 5000)
//! - `JOCARSA_DATA_DIR`: Directory of the module JSON files (default: data)
//! - `RUST_LOG`: Log filter, overrides the configured level

use clap::Parser;
use jocarsa_suite::api::{serve, ApiConfig, AppState};
use jocarsa_suite::config::Config;
use jocarsa_suite::logging::init_logging;

#[derive(Parser)]
#[command(name = "jocarsa-suite-api")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Module server for Jocarsa Suite")]
struct Args {
    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding module data files
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::load_default();

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.server.data_dir = data_dir;
    }

    init_logging(&config.logging, &["tower_http=debug"]);

    tracing::info!("Starting Jocarsa Suite module server v{}", env!("CARGO_PKG_VERSION"));

    let api_config = ApiConfig::from(&config.server);
    tracing::info!("Data directory: {:?}", api_config.data_dir);

    let state = AppState::new(api_config.clone());
    tracing::info!(modules = state.registry.len(), "Module backends registered");

    serve(state, &api_config).await?;

    tracing::info!("Jocarsa Suite module server stopped");
    Ok(())
}
