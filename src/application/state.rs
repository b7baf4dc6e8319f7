//! Interactive session state
//!
//! One `AppState` lives for the whole run and is owned by the front-end loop.
//! Commands borrow it mutably; nothing here is shared across threads.

use tracing::{debug, info};

use super::error::{SessionError, SessionResult};
use super::extraction_service::ExtractionReport;
use crate::domain::pagination::{PageCursor, PageDirection, page_url};
use crate::domain::product::{ProductSet, ProductSource};
use crate::domain::selection::Selection;
use crate::infrastructure::config::AppConfig;

pub struct AppState {
    config: AppConfig,
    /// Listing URL of the active search, as entered by the user
    base_url: Option<String>,
    cursor: PageCursor,
    products: ProductSet,
    selection: Selection,
    source: Option<ProductSource>,
    /// Last user-visible status line
    notice: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            base_url: None,
            cursor: PageCursor::default(),
            products: ProductSet::new(),
            selection: Selection::new(),
            source: None,
            notice: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn site_base(&self) -> &str {
        &self.config.user.scraper.site_base
    }

    /// Trim and check a search URL against the configured site
    pub fn validate_search_url(&self, url: &str) -> SessionResult<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SessionError::EmptyUrl);
        }
        if !url.contains(self.site_base()) {
            return Err(SessionError::UnsupportedSite {
                url: url.to_string(),
                site_base: self.site_base().to_string(),
            });
        }
        Ok(url.to_string())
    }

    /// Start a new search: store the base URL, reset paging, drop the selection.
    /// Returns the URL of the first page.
    pub fn begin_search(&mut self, url: &str) -> SessionResult<String> {
        let url = self.validate_search_url(url)?;
        info!("New search: {}", url);

        self.cursor.reset();
        self.selection.clear();
        let first = page_url(&url, self.cursor.page());
        self.base_url = Some(url);
        Ok(first)
    }

    /// URL for `page` of the active search
    pub fn page_target(&self, page: u32) -> SessionResult<String> {
        let base = self.base_url.as_deref().ok_or(SessionError::NoActiveSearch)?;
        Ok(page_url(base, PageCursor::new(page).page()))
    }

    /// Target page for a relative move; `Ok(None)` when already at the edge
    pub fn step_target(&self, direction: PageDirection) -> SessionResult<Option<u32>> {
        if self.base_url.is_none() {
            return Err(SessionError::NoActiveSearch);
        }
        Ok(self.cursor.peek(direction))
    }

    /// Replace the page contents with a fresh extraction result
    pub fn apply_report(&mut self, report: ExtractionReport) {
        self.cursor.set(report.page);
        self.products = report.products;
        self.source = report.source;
        self.selection.retain_existing(&self.products);

        self.notice = Some(match report.error {
            Some(error) => format!("Failed to load page {}: {}", self.cursor.page(), error),
            None if self.products.is_empty() => {
                format!("No products found on page {}", self.cursor.page())
            }
            None => format!(
                "Found {} products on page {}",
                self.products.len(),
                self.cursor.page()
            ),
        });
        debug!("Session notice: {:?}", self.notice);
    }

    /// Toggle one code on the current page; returns the new state
    pub fn toggle_selection(&mut self, code: &str) -> SessionResult<bool> {
        if !self.products.contains(code) {
            return Err(SessionError::UnknownProduct {
                code: code.to_string(),
            });
        }
        Ok(self.selection.toggle(code))
    }

    pub fn select_all(&mut self) -> usize {
        self.selection.select_all(&self.products, true);
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.cursor.page()
    }

    pub fn products(&self) -> &ProductSet {
        &self.products
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn source(&self) -> Option<ProductSource> {
        self.source
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductRef;

    const LIST_URL: &str = "https://www.kolonmall.com/Category/List/001";

    fn report(page: u32, codes: &[&str]) -> ExtractionReport {
        ExtractionReport {
            url: page_url(LIST_URL, page),
            page,
            products: codes
                .iter()
                .map(|code| ProductRef::new(*code, ProductSource::Dom))
                .collect(),
            source: Some(ProductSource::Dom),
            error: None,
        }
    }

    #[test]
    fn test_url_validation() {
        let state = AppState::new(AppConfig::default());

        assert!(matches!(state.validate_search_url("   "), Err(SessionError::EmptyUrl)));
        assert!(matches!(
            state.validate_search_url("https://example.com/list"),
            Err(SessionError::UnsupportedSite { .. })
        ));
        assert_eq!(
            state.validate_search_url(&format!("  {LIST_URL}  ")).unwrap(),
            LIST_URL
        );
    }

    #[test]
    fn test_begin_search_resets_session() {
        let mut state = AppState::new(AppConfig::default());
        state.begin_search(LIST_URL).unwrap();
        state.apply_report(report(3, &["A1", "A2"]));
        state.toggle_selection("A1").unwrap();

        let first = state.begin_search(&format!("{LIST_URL}?page=3")).unwrap();

        assert_eq!(first, format!("{LIST_URL}?page=1"));
        assert_eq!(state.page(), 1);
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_navigation_requires_search() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(state.page_target(2), Err(SessionError::NoActiveSearch)));
        assert!(matches!(
            state.step_target(PageDirection::Next),
            Err(SessionError::NoActiveSearch)
        ));
    }

    #[test]
    fn test_selection_pruned_on_new_page() {
        let mut state = AppState::new(AppConfig::default());
        state.begin_search(LIST_URL).unwrap();
        state.apply_report(report(1, &["A1", "A2", "A3"]));
        state.toggle_selection("A1").unwrap();
        state.toggle_selection("A3").unwrap();

        state.apply_report(report(2, &["A3", "B1"]));

        assert_eq!(state.selection().ordered_codes(state.products()), vec!["A3"]);
        assert_eq!(state.notice(), Some("Found 2 products on page 2"));
    }

    #[test]
    fn test_failed_report_empties_page() {
        let mut state = AppState::new(AppConfig::default());
        state.begin_search(LIST_URL).unwrap();
        state.apply_report(report(1, &["A1"]));

        state.apply_report(ExtractionReport {
            page: 2,
            error: Some("HTTP 503".to_string()),
            ..ExtractionReport::default()
        });

        assert!(state.products().is_empty());
        assert_eq!(state.page(), 2);
        assert_eq!(state.notice(), Some("Failed to load page 2: HTTP 503"));
    }

    #[test]
    fn test_toggle_unknown_code() {
        let mut state = AppState::new(AppConfig::default());
        assert!(matches!(
            state.toggle_selection("NOPE"),
            Err(SessionError::UnknownProduct { .. })
        ));
    }
}
