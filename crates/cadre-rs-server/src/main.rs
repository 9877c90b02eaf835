//! Cadre server binary.

use anyhow::Context;
use cadre_rs_config::{CadreConfig, load_config};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Command-line options for the Cadre server.
#[derive(Parser)]
#[command(name = "cadre", version)]
struct Cli {
    /// Optional path to a cadre.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen port override
    #[arg(long)]
    port: Option<u16>,
    /// Override the interaction storage directory
    #[arg(long)]
    store: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    info!(
        "starting cadre server (config_set={}, port_set={})",
        cli.config.is_some(),
        cli.port.is_some()
    );

    let mut config: CadreConfig =
        load_config(cli.config.as_deref()).context("failed to load config")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(store) = cli.store {
        config.interactions.path = Some(store);
    }

    cadre_rs_server::start_server(config).await
}
