use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use yt_dlp_link_api::config::load_config;
use yt_dlp_link_api::extractor::YtDlpExtractor;
use yt_dlp_link_api::models::RawExtraction;
use yt_dlp_link_api::orchestrator::Workflow;
use yt_dlp_link_api::{mapper, router, AppState};

// --- Command-Line Argument Parsing ---
#[derive(Parser, Debug)]
#[command(author, version, about = "Resolves video download links through yt-dlp.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server in the foreground.
    Serve {
        /// Config file to use instead of the platform default.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run format selection over a saved `yt-dlp --dump-json` document.
    Select {
        /// Path to the JSON dump, or `-` for stdin.
        input: PathBuf,
        /// Pick this format (plus audio if it is video-only).
        #[arg(long)]
        format_id: Option<String>,
        /// Maximum video height for automatic selection.
        #[arg(long)]
        max_quality: Option<u32>,
        /// List every video format and the best audio instead.
        #[arg(long, conflicts_with_all = ["format_id", "max_quality"])]
        all: bool,
    },
}

// --- Main Application Logic ---
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => run_server(config).await?,
        Commands::Select { input, format_id, max_quality, all } => {
            let workflow = if all {
                Workflow::ListAll
            } else {
                Workflow::download(format_id.as_deref(), max_quality)
            };
            select_from_dump(&input, workflow)?
        }
    }

    Ok(())
}

/// The core function that runs the Axum web server.
async fn run_server(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path.as_deref()).await?.with_env_overrides();
    let addr = config.listen_addr();
    let extractor = Arc::new(YtDlpExtractor::new(config.ytdlp_path.clone()));
    let app = router(AppState::new(config, extractor));

    tracing::info!("Starting server in foreground, listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Offline selection: reads a dump, prints the canonical response.
fn select_from_dump(input: &Path, workflow: Workflow<'_>) -> anyhow::Result<()> {
    let content = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?
    };

    let info: RawExtraction = serde_json::from_str(&content).context("Input is not a yt-dlp JSON dump")?;
    let selection = workflow.select(&info.formats);
    let response = mapper::map_response(&info.meta, &selection);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
