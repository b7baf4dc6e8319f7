//! Search and page navigation commands
//!
//! Every command re-runs the whole fetch/extract/merge pipeline for the target
//! page. Fetch and parse failures are not errors here: they come back inside
//! the summary and the session notice.

use tracing::{error, info, warn};

use crate::application::{AppState, ProductExtractionService, SessionError};
use crate::domain::pagination::{FIRST_PAGE, PageDirection};
use crate::domain::product::ProductSource;
use crate::domain::services::PageFetcher;

/// Outcome of a search or navigation command
#[derive(Debug, Clone)]
pub struct PageSummary {
    pub page: u32,
    pub url: String,
    pub product_count: usize,
    pub source: Option<ProductSource>,
    pub error: Option<String>,
    /// `false` when the command was a no-op (e.g. `prev` on page 1)
    pub fetched: bool,
}

/// Snapshot for the status command
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub base_url: Option<String>,
    pub page: u32,
    pub product_count: usize,
    pub selected_count: usize,
    pub source: Option<ProductSource>,
    pub text_scan_fallback: bool,
    pub notice: Option<String>,
}

/// Record a rejected command on the session and render it for the user
pub(crate) fn reject(state: &mut AppState, error: SessionError) -> String {
    let message = error.to_string();
    if error.is_input_error() {
        warn!("{}", message);
    } else {
        error!("{}", message);
    }
    state.set_notice(message.clone());
    message
}

async fn load_page<F: PageFetcher>(
    state: &mut AppState,
    service: &ProductExtractionService<F>,
    url: String,
    page: u32,
) -> PageSummary {
    let report = service.extract_from_url(&url, page).await;
    let summary = PageSummary {
        page: report.page,
        url: report.url.clone(),
        product_count: report.products.len(),
        source: report.source,
        error: report.error.clone(),
        fetched: true,
    };
    state.apply_report(report);
    summary
}

fn unchanged(state: &AppState) -> PageSummary {
    PageSummary {
        page: state.page(),
        url: state.page_target(state.page()).unwrap_or_default(),
        product_count: state.products().len(),
        source: state.source(),
        error: None,
        fetched: false,
    }
}

/// Start a new search from a listing URL
pub async fn search_products<F: PageFetcher>(
    state: &mut AppState,
    service: &ProductExtractionService<F>,
    url: &str,
) -> Result<PageSummary, String> {
    let first = state.begin_search(url).map_err(|e| reject(state, e))?;
    Ok(load_page(state, service, first, FIRST_PAGE).await)
}

/// Jump to `page`; values below 1 are clamped to the first page
pub async fn go_to_page<F: PageFetcher>(
    state: &mut AppState,
    service: &ProductExtractionService<F>,
    page: u32,
) -> Result<PageSummary, String> {
    let page = page.max(FIRST_PAGE);
    let url = state.page_target(page).map_err(|e| reject(state, e))?;
    info!("Navigating to page {}", page);
    Ok(load_page(state, service, url, page).await)
}

pub async fn next_page<F: PageFetcher>(
    state: &mut AppState,
    service: &ProductExtractionService<F>,
) -> Result<PageSummary, String> {
    step_page(state, service, PageDirection::Next).await
}

pub async fn prev_page<F: PageFetcher>(
    state: &mut AppState,
    service: &ProductExtractionService<F>,
) -> Result<PageSummary, String> {
    step_page(state, service, PageDirection::Previous).await
}

async fn step_page<F: PageFetcher>(
    state: &mut AppState,
    service: &ProductExtractionService<F>,
    direction: PageDirection,
) -> Result<PageSummary, String> {
    match state.step_target(direction).map_err(|e| reject(state, e))? {
        Some(page) => go_to_page(state, service, page).await,
        None => {
            state.set_notice("Already on the first page");
            Ok(unchanged(state))
        }
    }
}

pub fn session_status(state: &AppState) -> SessionStatus {
    SessionStatus {
        base_url: state.base_url().map(str::to_string),
        page: state.page(),
        product_count: state.products().len(),
        selected_count: state.selection().len(),
        source: state.source(),
        text_scan_fallback: state.config().user.scraper.text_scan_fallback,
        notice: state.notice().map(str::to_string),
    }
}
