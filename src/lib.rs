//! Product Extractor - listing page product code extraction
//!
//! Fetches e-commerce listing pages, pulls product codes out of the embedded
//! client state or the product links, and lets the user page through results,
//! select products and export their codes.

// Module declarations
pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod repl;

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::application::{AppState, ProductExtractionService};
use crate::domain::export::ExportScope;
use crate::domain::services::PageFetcher;
use crate::infrastructure::{ConfigManager, HttpClient, init_logging_with_config};

/// What the binary was asked to do
#[derive(Debug, Clone)]
pub enum RunMode {
    /// Interactive session
    Repl,
    /// One-shot extraction of a single page
    Scrape {
        url: String,
        page: u32,
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub mode: RunMode,
}

pub fn run(options: RunOptions) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let manager = match options.config_path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = runtime
        .block_on(manager.load_config())
        .with_context(|| format!("Failed to load config from {}", manager.config_path().display()))?;
    if let Some(level) = options.log_level {
        config.user.logging.level = level;
    }

    init_logging_with_config(&config.user.logging)?;
    info!(
        "product-extractor v{} (config: {})",
        env!("CARGO_PKG_VERSION"),
        manager.config_path().display()
    );

    let client = HttpClient::from_scraper_config(&config.user.scraper)
        .context("Failed to create HTTP client")?;
    let service =
        ProductExtractionService::new(client, &config.user.scraper, &config.advanced.extraction)?;
    let mut state = AppState::new(config);

    match options.mode {
        RunMode::Repl => repl::run(&runtime, &service, &mut state),
        RunMode::Scrape { url, page, output } => {
            scrape(&runtime, &service, &mut state, &url, page, output)
        }
    }
}

/// Extract one page and print or save its codes
pub fn scrape<F: PageFetcher>(
    runtime: &Runtime,
    service: &ProductExtractionService<F>,
    state: &mut AppState,
    url: &str,
    page: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    state.begin_search(url)?;
    let summary = runtime
        .block_on(commands::go_to_page(state, service, page))
        .map_err(anyhow::Error::msg)?;

    if let Some(error) = summary.error {
        bail!("Failed to load page {}: {}", summary.page, error);
    }
    if summary.product_count == 0 {
        warn!("No products found on page {}", summary.page);
        return Ok(());
    }

    match output {
        Some(path) => {
            let saved = runtime
                .block_on(commands::download_codes(state, Some(path), ExportScope::All))
                .map_err(anyhow::Error::msg)?;
            info!("Saved {} codes to {}", saved.count, saved.path.display());
        }
        None => {
            let text = commands::copy_codes(state, ExportScope::All).map_err(anyhow::Error::msg)?;
            println!("{text}");
        }
    }

    Ok(())
}
