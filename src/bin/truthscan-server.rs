// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! TruthScan API server
//!
//! Standalone server for the detection API and the browser UI.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use truthscan::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "truthscan-server")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "TruthScan detection API and web UI")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Open browser automatically
    #[arg(long)]
    open: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_target(false)
        .init();

    info!("TruthScan API v{}", env!("CARGO_PKG_VERSION"));

    match dotenvy::dotenv() {
        Ok(path) => info!("Environment loaded from {:?}", path),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).context("reading .env"),
    }

    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {:?}", args.config))?;
    config.apply_env();

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    if args.open {
        let url = format!("http://{}:{}", config.server.host, config.server.port);
        if let Err(e) = open_browser(&url) {
            error!("Failed to open browser: {}", e);
        }
    }

    truthscan::web::start_server(config).await?;
    Ok(())
}

fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }
    Ok(())
}
