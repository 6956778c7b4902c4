//! midi2joy entry point

use anyhow::Result;
use clap::Parser;
use tracing::info;

use midi2joy::cli::Cli;
use midi2joy::config::Config;
use midi2joy::midi;
use midi2joy::runtime::{self, RunOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.list_ports {
        let ports = midi::list_ports()?;
        if ports.is_empty() {
            println!("No MIDI input ports found");
        }
        for (index, name) in ports.iter().enumerate() {
            println!("{index}: {name}");
        }
        return Ok(());
    }

    // Load config
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    info!("Loading config from {:?}", config_path);
    let mut config = Config::load(&config_path)?;

    if let Some(name) = cli.device_name {
        config.device_name = name;
    }
    if !cli.ports.is_empty() {
        config.ports = cli.ports;
    }

    let options = RunOptions {
        dry_run: cli.dry_run,
        check: cli.check,
    };
    runtime::run(config, &cli.rules, options).await
}
