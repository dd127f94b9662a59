//! mediagrab - local web front-end for downloading YouTube media and images
//!
//! Serves a small HTML interface backed by yt-dlp for extraction and
//! downloads, with format selection, image conversion and a session history.

use anyhow::Result;
use clap::Parser;
use mediagrab::app;
use mediagrab::downloader::MediaDownloader;
use mediagrab::extractor::ytdlp::find_ytdlp;
use mediagrab::extractor::{RetryPolicy, YtDlpExtractor};
use mediagrab::selector::{select, Quality, SelectionRequest};
use mediagrab::utils::AppSettings;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Config file (defaults to ./mediagrab.toml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8501
    #[arg(long)]
    bind: Option<String>,

    /// Default download directory
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long)]
    ytdlp: Option<PathBuf>,

    /// Print metadata and the default selection for a URL, then exit
    #[arg(long, value_name = "URL")]
    inspect: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_source = AppSettings::config_source(args.config.as_deref());
    let mut settings = AppSettings::load(config_source.as_deref())?;
    if let Some(bind) = args.bind {
        settings.bind_address = bind;
    }
    if let Some(dir) = args.download_dir {
        settings.download_location = Some(dir);
    }
    if let Some(ytdlp) = args.ytdlp {
        settings.ytdlp_path = Some(ytdlp);
    }

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &config_source {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    check_ytdlp_installed(&settings);

    let rt = tokio::runtime::Runtime::new()?;
    match args.inspect {
        Some(url) => rt.block_on(inspect(settings, url)),
        None => rt.block_on(app::run(settings)),
    }
}

fn check_ytdlp_installed(settings: &AppSettings) {
    let found = settings.ytdlp_path.clone().or_else(find_ytdlp);
    match found {
        Some(path) => info!("yt-dlp found at: {}", path.display()),
        None => {
            warn!("yt-dlp not found in PATH or common locations");
            warn!("Video extraction will fail. Install it with `pip install yt-dlp`");
        }
    }
}

/// Headless check of extraction and selection for one URL
async fn inspect(settings: AppSettings, url: String) -> Result<()> {
    let extractor = YtDlpExtractor::new(settings.ytdlp_path.as_deref())?;
    println!("yt-dlp:   {}", extractor.ytdlp_path().display());
    let downloader = MediaDownloader::new(
        Arc::new(extractor),
        RetryPolicy::from_settings(&settings),
        settings.default_container.clone(),
    );

    let metadata = downloader.fetch_metadata(&url).await?;
    println!("Title:    {}", metadata.title);
    println!("Author:   {}", metadata.author);
    println!("Duration: {}", metadata.duration_label);
    println!("Views:    {}", metadata.views_label);
    println!("Streams:  {}", metadata.streams.len());
    for quality in &metadata.available_qualities {
        println!("  {}", quality);
    }

    let request = SelectionRequest::video(settings.default_container.as_str(), Quality::Best, true);
    match select(&metadata.streams, &request) {
        Ok(selection) => {
            println!(
                "Default selection: format {} ({})",
                selection.descriptor.format_id,
                selection.descriptor.summary()
            );
            for warning in selection.warnings() {
                println!("  warning: {}", warning);
            }
        }
        Err(e) => println!("Default selection: {}", e.user_message()),
    }

    Ok(())
}
