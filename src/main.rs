#![deny(unsafe_code)]

mod common;
mod config;
mod constants;
mod daemon;
mod manager;
mod x11;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "screen-crosshair")]
#[command(version)]
#[command(about = "Always-on-top crosshair overlay with a settings window", long_about = None)]
struct Cli {
    /// Run the overlay daemon (draws the crosshair) instead of the settings window
    #[arg(long)]
    overlay: bool,

    /// Name of the IPC server to connect to for settings and status updates
    #[arg(long, requires = "overlay")]
    ipc_server: Option<String>,

    /// Settings file location (defaults to crosshair_config.json next to the executable)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let config_path = cli.config.unwrap_or_else(config::default_path);

    if cli.overlay {
        // The overlay runs in its own process so X11 rendering never blocks the settings window
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build Tokio runtime")?;

        rt.block_on(daemon::run_overlay_daemon(cli.ipc_server, config_path))
    } else {
        manager::run_gui(config_path, cli.debug)
    }
}
