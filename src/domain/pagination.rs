//! Pagination domain logic.
//!
//! Responsibility:
//! - 1-based page counter that never drops below the first page
//! - rewriting the `page` query parameter on a listing URL

use once_cell::sync::Lazy;
use regex::Regex;

/// First page of every listing
pub const FIRST_PAGE: u32 = 1;

static PAGE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[&?]page=[^&#]*").expect("page parameter pattern is valid"));

/// Direction of a relative page move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

/// Current listing page, clamped to `FIRST_PAGE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self { page: FIRST_PAGE }
    }
}

impl PageCursor {
    pub fn new(page: u32) -> Self {
        Self {
            page: page.max(FIRST_PAGE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_first(&self) -> bool {
        self.page == FIRST_PAGE
    }

    /// Replace the counter; returns `true` when the page changed
    pub fn set(&mut self, page: u32) -> bool {
        let page = page.max(FIRST_PAGE);
        let changed = page != self.page;
        self.page = page;
        changed
    }

    /// Target page for a relative move without applying it.
    /// `None` when moving back from the first page.
    pub fn peek(&self, direction: PageDirection) -> Option<u32> {
        match direction {
            PageDirection::Previous if self.is_first() => None,
            PageDirection::Previous => Some(self.page - 1),
            PageDirection::Next => Some(self.page.saturating_add(1)),
        }
    }

    /// Apply a relative move; returns `true` when the page changed
    pub fn step(&mut self, direction: PageDirection) -> bool {
        match self.peek(direction) {
            Some(page) => self.set(page),
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.page = FIRST_PAGE;
    }
}

/// Build the listing URL for `page` from a stored base URL.
///
/// Every prior `page=` occurrence (any value, including an empty one) is
/// stripped before the new one is appended.
pub fn page_url(base_url: &str, page: u32) -> String {
    let mut clean = PAGE_PARAM.replace_all(base_url, "").into_owned();

    // stripping a leading `?page=n` may leave `path&rest`
    if !clean.contains('?') {
        if let Some(pos) = clean.find('&') {
            clean.replace_range(pos..=pos, "?");
        }
    }

    let separator = if clean.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", clean, separator, page.max(FIRST_PAGE))
}
