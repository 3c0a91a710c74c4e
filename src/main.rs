use std::path::PathBuf;

use anyhow::Result;
use keymaster_lib::config::KeymasterConfig;
use keymaster_lib::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("keymaster.json"));
    let config = KeymasterConfig::load(&config_path)?;

    tracing::info!(config = ?config, "keymaster starting");

    server::start_server(config).await?;
    Ok(())
}
