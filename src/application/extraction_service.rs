//! Product extraction service
//!
//! Coordinates one listing page: fetch, run every parser over the same
//! document, then pick the authoritative result.

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{debug, info, warn};

use crate::domain::product::{ProductSet, ProductSource};
use crate::domain::services::PageFetcher;
use crate::infrastructure::config::{ExtractionConfig, ScraperConfig};
use crate::infrastructure::parsing::{
    AnchorProductParser, EmbeddedStateParser, ParseContext, ParsingResult, ProductParser,
    TextScanParser,
};

/// Products chosen from one document and the parser they came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedProducts {
    pub products: ProductSet,
    /// `None` when every source came back empty
    pub source: Option<ProductSource>,
}

/// Result of a fetch-and-extract run.
///
/// Failures never propagate out of the pipeline; they leave `products` empty
/// and carry a message for the user in `error`.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub url: String,
    pub page: u32,
    pub products: ProductSet,
    pub source: Option<ProductSource>,
    pub error: Option<String>,
}

impl ExtractionReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Pick one source as authoritative.
///
/// Embedded state wins when non-empty, then anchors. The text-scan set is only
/// consulted when both are empty. Sets are never combined.
pub fn merge_sources(
    embedded: ProductSet,
    dom: ProductSet,
    text_scan: Option<ProductSet>,
) -> MergedProducts {
    let (products, source) = if !embedded.is_empty() {
        (embedded, ProductSource::EmbeddedState)
    } else if !dom.is_empty() {
        (dom, ProductSource::Dom)
    } else {
        match text_scan {
            Some(scanned) if !scanned.is_empty() => (scanned, ProductSource::TextScan),
            _ => return MergedProducts::default(),
        }
    };

    MergedProducts {
        products,
        source: Some(source),
    }
}

pub struct ProductExtractionService<F: PageFetcher> {
    fetcher: F,
    anchor_parser: AnchorProductParser,
    state_parser: EmbeddedStateParser,
    text_scan_parser: Option<TextScanParser>,
}

impl<F: PageFetcher> ProductExtractionService<F> {
    /// Build the service; the text-scan parser is only created when enabled
    pub fn new(fetcher: F, scraper: &ScraperConfig, extraction: &ExtractionConfig) -> Result<Self> {
        let anchor_parser = AnchorProductParser::with_config(extraction)
            .context("Failed to create anchor product parser")?;
        let state_parser = EmbeddedStateParser::with_config(extraction)
            .context("Failed to create embedded state parser")?;
        let text_scan_parser = if scraper.text_scan_fallback {
            Some(
                TextScanParser::with_config(extraction)
                    .context("Failed to create text scan parser")?,
            )
        } else {
            None
        };

        Ok(Self {
            fetcher,
            anchor_parser,
            state_parser,
            text_scan_parser,
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn text_scan_enabled(&self) -> bool {
        self.text_scan_parser.is_some()
    }

    /// Run every parser over `html` and merge the results
    pub fn extract_from_html(&self, html: &str, context: &ParseContext) -> ParsingResult<MergedProducts> {
        let document = Html::parse_document(html);

        let embedded = run_parser(&self.state_parser, &document, context)?;
        let dom = run_parser(&self.anchor_parser, &document, context)?;
        let text_scan = match &self.text_scan_parser {
            Some(parser) if embedded.is_empty() && dom.is_empty() => {
                let scanned = parser.scan(html);
                debug!("{} parser: {} products", ProductSource::TextScan, scanned.len());
                Some(scanned)
            }
            _ => None,
        };

        Ok(merge_sources(embedded, dom, text_scan))
    }

    /// Fetch `url` and extract its products
    pub async fn extract_from_url(&self, url: &str, page: u32) -> ExtractionReport {
        let mut report = ExtractionReport {
            url: url.to_string(),
            page,
            ..ExtractionReport::default()
        };

        let html = match self.fetcher.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Fetch failed for page {}: {}", page, e);
                report.error = Some(e.to_string());
                return report;
            }
        };

        let context = ParseContext::new(page, url);
        match self.extract_from_html(&html, &context) {
            Ok(merged) => {
                info!(
                    "Extracted {} products from page {} (source: {})",
                    merged.products.len(),
                    page,
                    merged
                        .source
                        .map_or_else(|| "none".to_string(), |s| s.to_string())
                );
                report.products = merged.products;
                report.source = merged.source;
            }
            Err(e) => {
                warn!("Extraction failed for page {}: {}", page, e);
                report.error = Some(e.to_string());
            }
        }

        report
    }
}

fn run_parser<P: ProductParser>(
    parser: &P,
    document: &Html,
    context: &ParseContext,
) -> ParsingResult<ProductSet> {
    let products = parser.parse_with_context(document, context)?;
    debug!("{} parser: {} products", parser.source(), products.len());
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductRef;

    fn set_of(codes: &[&str], source: ProductSource) -> ProductSet {
        codes.iter().map(|code| ProductRef::new(*code, source)).collect()
    }

    #[test]
    fn test_embedded_state_wins() {
        let embedded = set_of(&["S1", "S2"], ProductSource::EmbeddedState);
        let dom = set_of(&["D1"], ProductSource::Dom);

        let merged = merge_sources(embedded.clone(), dom, None);
        assert_eq!(merged.products, embedded);
        assert_eq!(merged.source, Some(ProductSource::EmbeddedState));
    }

    #[test]
    fn test_dom_used_when_state_empty() {
        let dom = set_of(&["D1", "D2"], ProductSource::Dom);

        let merged = merge_sources(ProductSet::new(), dom.clone(), None);
        assert_eq!(merged.products, dom);
        assert_eq!(merged.source, Some(ProductSource::Dom));
    }

    #[test]
    fn test_text_scan_only_when_both_empty() {
        let scanned = set_of(&["T1"], ProductSource::TextScan);

        let merged = merge_sources(ProductSet::new(), ProductSet::new(), Some(scanned.clone()));
        assert_eq!(merged.products, scanned);
        assert_eq!(merged.source, Some(ProductSource::TextScan));

        let empty = merge_sources(ProductSet::new(), ProductSet::new(), Some(ProductSet::new()));
        assert!(empty.products.is_empty());
        assert_eq!(empty.source, None);
    }
}
