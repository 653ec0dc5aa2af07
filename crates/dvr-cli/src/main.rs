//! DVR CLI — operator tool for distance-vector routing nodes.
//!
//! Subcommands: init, routes, inject.

mod commands;

use clap::{Parser, Subcommand};

/// dvr — inspect and poke distance-vector routing nodes.
#[derive(Parser, Debug)]
#[command(name = "dvr", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a node configuration and neighbor file template.
    Init(commands::init::InitArgs),
    /// Print the routing table of a running node.
    Routes(commands::routes::RoutesArgs),
    /// Post a hand-written routing update to a node.
    Inject(commands::inject::InjectArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Routes(args) => commands::routes::run(args).await,
        Commands::Inject(args) => commands::inject::run(args).await,
    }
}
