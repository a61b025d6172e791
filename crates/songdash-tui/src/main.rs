mod action;
mod app;
mod app_state;
mod charts;
mod component;
mod components;
mod export;
mod focus;
mod rating;
mod sort;
mod theme;
mod view_state;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use catalog_proto::{config::Config, platform, HttpCatalog};

use crate::app_state::AppState;
use crate::view_state::ViewState;

#[derive(Parser, Debug)]
#[command(name = "songdash", about = "Terminal dashboard for a song catalog service")]
struct Args {
    /// Catalog service root, e.g. http://127.0.0.1:5000.
    #[arg(long)]
    base_url: Option<String>,

    /// Songs per page.
    #[arg(long)]
    page_size: Option<u32>,

    /// Directory songs.csv is exported into.
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let log_path = platform::log_path();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("songdash log: {}", log_path.display());

    tracing::info!("songdash starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config_path = args.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    if let Some(base_url) = args.base_url {
        config.catalog.base_url = base_url;
    }
    if let Some(page_size) = args.page_size.filter(|&n| n > 0) {
        config.catalog.page_size = page_size;
    }
    if let Some(dir) = args.export_dir {
        config.export.dir = dir;
    }
    tracing::debug!("config: {:?}", config);

    // ── Catalog client ───────────────────────────────────────────────────────
    let catalog = HttpCatalog::new(&config.catalog).context("building catalog client")?;
    tracing::info!("catalog at {}", catalog.base_url());

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let state = AppState::new(
        ViewState::new(config.catalog.page_size, config.ui.sync_search_ratings),
        config.catalog.base_url.clone(),
        config.export.dir.clone(),
        log_path,
    );
    let app = app::App::new(state, Arc::new(catalog), config.ui.show_keys_bar);
    app.run().await?;

    tracing::info!("songdash exiting");
    Ok(())
}
