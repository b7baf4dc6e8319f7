//! End-to-end session flow: search, paging, selection and export
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use product_extractor_lib::application::{AppState, ProductExtractionService};
use product_extractor_lib::commands;
use product_extractor_lib::domain::export::{EXPORT_FILE_NAME, ExportScope};
use product_extractor_lib::domain::services::{FetchError, PageFetcher};
use product_extractor_lib::infrastructure::config::{AppConfig, ExtractionConfig, ScraperConfig};

const LIST_URL: &str = "https://www.kolonmall.com/Category/List/001";

/// Serves canned pages by URL and records every request
#[derive(Default)]
struct CannedSite {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl CannedSite {
    fn with_page(mut self, page: u32, codes: &[&str]) -> Self {
        let anchors: String = codes
            .iter()
            .map(|code| format!(r#"<a href="/Product/{code}"><img src="/i/{code}.jpg" alt="{code} item"></a>"#))
            .collect();
        self.pages.insert(
            format!("{LIST_URL}?page={page}"),
            format!("<html><body>{anchors}</body></html>"),
        );
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for CannedSite {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

fn session(site: CannedSite, config: AppConfig) -> (ProductExtractionService<CannedSite>, AppState) {
    let service = ProductExtractionService::new(
        site,
        &ScraperConfig::default(),
        &ExtractionConfig::default(),
    )
    .unwrap();
    (service, AppState::new(config))
}

fn default_site() -> CannedSite {
    CannedSite::default()
        .with_page(1, &["A1", "A2", "A3"])
        .with_page(2, &["B1", "A3"])
}

#[tokio::test]
async fn search_rejects_bad_input() {
    let (service, mut state) = session(default_site(), AppConfig::default());

    let empty = commands::search_products(&mut state, &service, "  ").await;
    assert!(empty.is_err());

    let foreign = commands::search_products(&mut state, &service, "https://example.com/list").await;
    assert!(foreign.unwrap_err().contains("https://www.kolonmall.com/"));

    assert!(service.fetcher().requests().is_empty());
    assert!(state.notice().is_some());
}

#[tokio::test]
async fn navigation_requires_active_search() {
    let (service, mut state) = session(default_site(), AppConfig::default());

    assert!(commands::next_page(&mut state, &service).await.is_err());
    assert!(commands::go_to_page(&mut state, &service, 3).await.is_err());
}

#[tokio::test]
async fn paging_rewrites_url_and_replaces_products() {
    let (service, mut state) = session(default_site(), AppConfig::default());

    let first = commands::search_products(&mut state, &service, &format!("{LIST_URL}?page=7"))
        .await
        .unwrap();
    assert_eq!(first.page, 1);
    assert_eq!(first.product_count, 3);

    let second = commands::next_page(&mut state, &service).await.unwrap();
    assert_eq!(second.page, 2);
    assert_eq!(state.products().codes(), vec!["B1", "A3"]);

    let back = commands::prev_page(&mut state, &service).await.unwrap();
    assert!(back.fetched);
    assert_eq!(state.page(), 1);

    let noop = commands::prev_page(&mut state, &service).await.unwrap();
    assert!(!noop.fetched);
    assert_eq!(state.page(), 1);
    assert_eq!(state.notice(), Some("Already on the first page"));

    assert_eq!(
        service.fetcher().requests(),
        vec![
            format!("{LIST_URL}?page=1"),
            format!("{LIST_URL}?page=2"),
            format!("{LIST_URL}?page=1"),
        ]
    );
}

#[tokio::test]
async fn page_zero_is_clamped() {
    let (service, mut state) = session(default_site(), AppConfig::default());
    commands::search_products(&mut state, &service, LIST_URL).await.unwrap();
    commands::next_page(&mut state, &service).await.unwrap();

    let summary = commands::go_to_page(&mut state, &service, 0).await.unwrap();
    assert_eq!(summary.page, 1);
    assert_eq!(state.page(), 1);
}

#[tokio::test]
async fn missing_page_leaves_empty_result_with_notice() {
    let (service, mut state) = session(default_site(), AppConfig::default());
    commands::search_products(&mut state, &service, LIST_URL).await.unwrap();

    let summary = commands::go_to_page(&mut state, &service, 9).await.unwrap();

    assert!(summary.error.is_some());
    assert!(state.products().is_empty());
    assert_eq!(state.page(), 9);
    assert!(state.notice().unwrap().contains("404"));
}

#[tokio::test]
async fn selection_survives_only_for_codes_still_shown() {
    let (service, mut state) = session(default_site(), AppConfig::default());
    commands::search_products(&mut state, &service, LIST_URL).await.unwrap();

    let changes = commands::toggle_products(&mut state, &["A1", "A3"]).unwrap();
    assert!(changes.iter().all(|change| change.selected));
    assert!(commands::toggle_products(&mut state, &["A2", "ZZ"]).is_err());
    assert_eq!(state.selection().len(), 2);

    commands::next_page(&mut state, &service).await.unwrap();
    assert_eq!(state.selection().ordered_codes(state.products()), vec!["A3"]);

    let rows = commands::list_products(&state);
    assert_eq!(rows.len(), 2);
    assert!(!rows[0].selected);
    assert!(rows[1].selected);
    assert_eq!(rows[1].detail_url, "https://www.kolonmall.com/Product/A3");
}

#[tokio::test]
async fn new_search_clears_selection() {
    let (service, mut state) = session(default_site(), AppConfig::default());
    commands::search_products(&mut state, &service, LIST_URL).await.unwrap();
    assert_eq!(commands::select_all_products(&mut state).unwrap(), 3);

    commands::search_products(&mut state, &service, LIST_URL).await.unwrap();
    assert!(state.selection().is_empty());
}

#[tokio::test]
async fn copy_and_download_export_codes() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.user.scraper.export_dir = Some(dir.path().join("exports"));

    let (service, mut state) = session(default_site(), config);
    commands::search_products(&mut state, &service, LIST_URL).await.unwrap();

    assert_eq!(
        commands::copy_codes(&mut state, ExportScope::All).unwrap(),
        "A1\nA2\nA3"
    );
    assert!(commands::copy_codes(&mut state, ExportScope::Selected).is_err());

    commands::toggle_products(&mut state, &["A3", "A1"]).unwrap();
    let summary = commands::download_codes(&mut state, None, ExportScope::Selected)
        .await
        .unwrap();

    assert_eq!(summary.count, 2);
    assert_eq!(summary.path, dir.path().join("exports").join(EXPORT_FILE_NAME));
    assert_eq!(std::fs::read_to_string(&summary.path).unwrap(), "A1\nA3");
}

#[tokio::test]
async fn download_into_existing_directory_uses_default_name() {
    let dir = tempfile::tempdir().unwrap();
    let (service, mut state) = session(default_site(), AppConfig::default());
    commands::search_products(&mut state, &service, LIST_URL).await.unwrap();

    let summary = commands::download_codes(&mut state, Some(dir.path().to_path_buf()), ExportScope::All)
        .await
        .unwrap();

    assert_eq!(summary.path, dir.path().join(EXPORT_FILE_NAME));
    assert_eq!(std::fs::read_to_string(&summary.path).unwrap(), "A1\nA2\nA3");
}

#[tokio::test]
async fn status_reflects_session() {
    let (service, mut state) = session(default_site(), AppConfig::default());
    commands::search_products(&mut state, &service, LIST_URL).await.unwrap();
    commands::toggle_products(&mut state, &["A2"]).unwrap();

    let status = commands::session_status(&state);
    assert_eq!(status.base_url.as_deref(), Some(LIST_URL));
    assert_eq!(status.product_count, 3);
    assert_eq!(status.selected_count, 1);
    assert!(!status.text_scan_fallback);
}
