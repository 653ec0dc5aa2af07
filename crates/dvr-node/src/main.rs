//! DVR routing node — entry point.
//!
//! Starts a distance-vector router with configuration from a TOML file,
//! an optional neighbor CSV file and command-line overrides.

mod api;
mod config;
mod logging;
mod node;
mod transport;

use clap::Parser;
use std::path::PathBuf;

use config::{DvrConfig, LoggingConfig};
use node::DvrNode;

/// DVR Routing Node
#[derive(Parser, Debug)]
#[command(name = "dvr-node", version, about = "Distance-vector routing node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "dvr.toml")]
    config: PathBuf,

    /// Override the API port (also this router's advertised port).
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the neighbor CSV file (`neighbor,cost`).
    #[arg(short = 'f', long = "file")]
    neighbors_file: Option<PathBuf>,

    /// Override the local network, e.g. 10.0.1.0/24.
    #[arg(long)]
    network: Option<String>,

    /// Override the advertisement interval in seconds.
    #[arg(long)]
    interval: Option<u64>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut DvrConfig) {
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(ref file) = self.neighbors_file {
            config.router.neighbors_file = Some(file.clone());
        }
        if let Some(ref network) = self.network {
            config.router.network = Some(network.clone());
        }
        if let Some(interval) = self.interval {
            config.router.update_interval_secs = interval;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        logging::init_tracing(&LoggingConfig::default())?;
        let config = DvrConfig::template();
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    // Load configuration and apply CLI overrides
    let mut config = DvrConfig::load(&args.config)?;
    args.apply_overrides(&mut config);

    logging::init_tracing(&config.logging)?;
    tracing::info!("DVR routing node v{}", env!("CARGO_PKG_VERSION"));

    let mut node = DvrNode::new(config)?;
    node.start().await?;

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received shutdown signal"),
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
        }
    };

    tokio::select! {
        result = node.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "node task error");
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    node.shutdown().await?;
    tracing::info!("routing node exited cleanly");
    Ok(())
}
