// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! TruthScan: AI-content detection from the command line
//!
//! One subcommand per detection panel. Each submission validates its input,
//! performs a single request and renders the result card.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use truthscan::client::{DetectClient, Detection};
use truthscan::config::AppConfig;
use truthscan::detectors::{DetectionService, Upload};
use truthscan::media::{self, MediaKind};
use truthscan::providers::Providers;
use truthscan::render;
use truthscan::{web, Result, TruthScanError};

/// TruthScan CLI - detect AI-generated content
#[derive(Parser, Debug)]
#[command(name = "truthscan")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Detect AI-generated text, images, video and audio", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Detection API base URL (overrides config and TRUTHSCAN_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether text was written by AI
    Text {
        /// Text to analyze; read from --file or stdin when omitted
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Run detection in-process instead of calling the API
        #[arg(long)]
        local: bool,
    },

    /// Scan an image for synthetic artifacts
    Image(FileArgs),

    /// Scan video frames for deepfake patterns
    Video(FileArgs),

    /// Listen for synthetic voice patterns
    Audio(FileArgs),

    /// Run the detection API and browser UI
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show API reachability and configured services
    Status,
}

#[derive(Args, Debug)]
struct FileArgs {
    /// File to upload
    path: PathBuf,

    /// Run detection in-process instead of calling the API
    #[arg(long)]
    local: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration (API keys masked)
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate,
}

/// What a detection command submits
enum Submission {
    Text(String),
    File(PathBuf),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(TruthScanError::Config(format!("Failed to read .env: {}", e))),
    }

    let mut config = AppConfig::load(&cli.config)?;
    config.apply_env();
    if let Some(url) = &cli.api_url {
        config.client.api_url = url.clone();
    }

    let output = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Text { text, file, local } => {
            let text = read_text(text, file.as_deref())?;
            run_detect(&config, MediaKind::Text, Submission::Text(text), local, output).await
        }
        Commands::Image(args) => run_detect(&config, MediaKind::Image, Submission::File(args.path), args.local, output).await,
        Commands::Video(args) => run_detect(&config, MediaKind::Video, Submission::File(args.path), args.local, output).await,
        Commands::Audio(args) => run_detect(&config, MediaKind::Audio, Submission::File(args.path), args.local, output).await,
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            web::start_server(config).await
        }
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Status => run_status(&config).await,
    }
}

/// Text from the argument, a file, or stdin (`-` also means stdin)
fn read_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    match text {
        Some(text) if text != "-" => Ok(text),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    fn show_spinner(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text && console::Term::stderr().is_term()
    }

    /// JSON mode prints the body as received, not the normalized result
    fn print(&self, detection: &Detection) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detection.raw)?),
            OutputFormat::Text => println!("{}", render::render_card(&detection.result, console::colors_enabled())),
        }
        Ok(())
    }
}

/// Validate, submit once, render
async fn run_detect(
    config: &AppConfig,
    kind: MediaKind,
    submission: Submission,
    local: bool,
    output: Output,
) -> Result<()> {
    match &submission {
        Submission::Text(text) if text.trim().is_empty() => {
            return Err(TruthScanError::Validation("Please enter some text to analyze.".to_string()));
        }
        Submission::File(path) => {
            if let Some(max) = config.limits.max_bytes(kind) {
                media::check_size(std::fs::metadata(path)?.len(), max)?;
            }
        }
        Submission::Text(_) => {}
    }

    let spinner = render::spinner(kind, output.show_spinner());
    let outcome = if local {
        detect_local(config, kind, submission).await
    } else {
        detect_remote(config, kind, submission).await
    };
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let detection = outcome?;
    let result = &detection.result;
    info!("{} verdict: {} ({}% confidence)", kind.label(), result.verdict, result.confidence);
    output.print(&detection)
}

async fn detect_local(config: &AppConfig, kind: MediaKind, submission: Submission) -> Result<Detection> {
    let service = DetectionService::from_config(config)?;
    let result = match submission {
        Submission::Text(text) => service.detect_text(&text).await,
        Submission::File(path) => {
            let upload = Upload::from_path(&path)?;
            service.detect_upload(kind, &upload).await?
        }
    };
    Detection::local(result)
}

async fn detect_remote(config: &AppConfig, kind: MediaKind, submission: Submission) -> Result<Detection> {
    let client = DetectClient::new(&config.client.api_url, config.client.timeout_secs)?;
    debug!("Submitting {} to {}", kind, client.base_url());
    match submission {
        Submission::Text(text) => client.detect_text(&text).await,
        Submission::File(path) => {
            let max = config.limits.max_bytes(kind).unwrap_or(u64::MAX);
            client.detect_file(kind, &path, max).await
        }
    }
}

/// Copy of the configuration with every API key masked
fn masked(config: &AppConfig) -> AppConfig {
    let mask = |key: &mut String| {
        if !key.is_empty() {
            *key = "********".to_string();
        }
    };

    let mut shown = config.clone();
    let p = &mut shown.providers;
    mask(&mut p.gptzero.api_key);
    mask(&mut p.huggingface.api_key);
    mask(&mut p.hive.api_key);
    mask(&mut p.aiornot.api_key);
    mask(&mut p.elevenlabs.api_key);
    shown
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&masked(&config))?);
        }
        ConfigCommands::Generate { output, force } => {
            if output.exists() && !force {
                return Err(TruthScanError::Config(format!(
                    "{:?} already exists. Use --force to overwrite",
                    output
                )));
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  API URL: {}", config.client.api_url);
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Video frames: {}", config.video.frames);
        }
    }

    Ok(())
}

/// Run status check
async fn run_status(config: &AppConfig) -> Result<()> {
    println!("TruthScan v{} Status", env!("CARGO_PKG_VERSION"));
    println!("=====================");

    let client = DetectClient::new(&config.client.api_url, config.client.timeout_secs)?;
    match client.health().await {
        Ok(banner) => println!("API ({}): {}", client.base_url(), banner),
        Err(e) => println!("API ({}): Error - {}", client.base_url(), e),
    }

    let providers = Providers::from_config(&config.providers)?;
    let configured = providers.configured();
    println!("\nDetection services (local mode):");
    if configured.is_empty() {
        println!("  none configured; text and audio fall back to local heuristics");
    }
    for name in configured {
        println!("  ✓ {}", name);
    }

    println!("\nUpload limits:");
    for kind in MediaKind::ALL.into_iter().filter(MediaKind::is_upload) {
        if let Some(max) = config.limits.max_bytes(kind) {
            println!("  {:<6} {} ({})", kind.label(), media::size_label(max), kind.formats_label());
        }
    }

    Ok(())
}
