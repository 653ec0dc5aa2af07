//! `dvr init` — scaffold a node configuration.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

const DEFAULT_CONFIG: &str = r#"# DVR routing node configuration

[router]
network = "10.0.0.0/24"
update_interval_secs = 10
neighbors_file = "neighbors.csv"

[api]
listen_addr = "0.0.0.0"
port = 5000
advertise_host = "127.0.0.1"

[transport]
timeout_secs = 5

[logging]
level = "info"
format = "text"
"#;

const DEFAULT_NEIGHBORS: &str = "neighbor,cost\n127.0.0.1:5001,1\n";

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join("dvr.toml");
    let neighbors_path = args.dir.join("neighbors.csv");

    for path in [&config_path, &neighbors_path] {
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
    }

    std::fs::create_dir_all(&args.dir)?;
    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    std::fs::write(&neighbors_path, DEFAULT_NEIGHBORS)?;

    println!("Initialized routing node at {}", args.dir.display());
    println!("Edit dvr.toml and neighbors.csv, then run:");
    println!("  dvr-node --config {}", config_path.display());

    Ok(())
}
