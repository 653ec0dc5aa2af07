use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.level.trim())
            .map_err(|e| anyhow::anyhow!("invalid logging.level: {e}"))?,
    };

    match config.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        "text" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        other => anyhow::bail!("invalid logging.format {other:?}: expected text or json"),
    }
    Ok(())
}
