//! beectl - remote control client for multi-app display devices
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use beectl::HeadlessEvent;
use beectl_app::config::{init_config_dir, load_settings};

/// beectl - control the apps on a display device from a terminal
#[derive(Parser, Debug)]
#[command(name = "beectl")]
#[command(about = "Remote control client for multi-app display devices", long_about = None)]
struct Args {
    /// Device host ("localhost" is treated as 127.0.0.1)
    #[arg(long)]
    host: Option<String>,

    /// Device port
    #[arg(long)]
    port: Option<u16>,

    /// Config file (defaults to .beectl/config.toml, then the per-user file)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Delay between reconnect attempts, in milliseconds
    #[arg(long, value_name = "MS")]
    reconnect_ms: Option<u64>,

    /// Write .beectl/config.toml with defaults and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    let args = Args::parse();

    color_eyre::install()?;

    // Logs go to a file; stdout carries NDJSON only.
    beectl_core::logging::init()?;

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if args.init {
        let path = init_config_dir(&cwd)?;
        eprintln!("Config file: {}", path.display());
        return Ok(());
    }

    let mut settings = match load_settings(args.config.as_deref(), &cwd) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
            return Err(e.into());
        }
    };

    if let Some(host) = args.host {
        settings.device.host = host;
    }
    if let Some(port) = args.port {
        settings.device.port = port;
    }
    if let Some(ms) = args.reconnect_ms {
        settings.connection.reconnect_delay_ms = ms;
    }

    let result = beectl::run_headless(settings).await;
    if let Err(ref e) = result {
        error!("Application error: {:?}", e);
    }

    info!("beectl exiting");
    Ok(result?)
}
