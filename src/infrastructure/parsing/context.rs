//! Parsing context for HTML extraction

use url::Url;

/// Context information for parsing one listing page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Listing page number (1-based)
    pub page: u32,

    /// URL the page was fetched from, used to resolve relative links
    pub page_url: String,

    base: Option<Url>,
}

impl ParseContext {
    /// Create new parse context
    pub fn new(page: u32, page_url: impl Into<String>) -> Self {
        let page_url = page_url.into();
        let base = Url::parse(&page_url).ok();
        Self {
            page,
            page_url,
            base,
        }
    }

    /// Context for markup that did not come from a URL
    pub fn detached() -> Self {
        Self {
            page: 1,
            page_url: String::new(),
            base: None,
        }
    }

    /// Resolve a possibly relative link against the page URL.
    ///
    /// Links that cannot be resolved are returned unchanged.
    pub fn resolve_url(&self, href: &str) -> String {
        let href = href.trim();
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }

        match &self.base {
            Some(base) => base
                .join(href)
                .map_or_else(|_| href.to_string(), |url| url.to_string()),
            None => href.to_string(),
        }
    }
}
