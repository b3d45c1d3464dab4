//! Uplink Daemon - Main entry point
//!
//! Serves the device registry and topology over a REST API.

mod api;
mod config;
mod server;
mod state;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "uplink")]
#[command(about = "Network device registry and topology service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "uplink.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Unknown level names fall back to info
    let level = args.log_level.parse::<Level>().unwrap_or(Level::INFO);
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish(),
    )?;

    info!("Uplink v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }

    info!(
        bind = %config.daemon.bind,
        tls = config.daemon.tls.is_some(),
        "Configuration loaded"
    );

    let state = state::AppState::new(config)?;

    server::run(state).await
}
