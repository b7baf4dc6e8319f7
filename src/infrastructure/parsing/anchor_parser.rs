//! Anchor-tag product parser
//!
//! Finds links whose `href` contains the product path marker and reads the
//! product code from the path segment after it. A nested `<img>` supplies the
//! thumbnail and the label.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use super::{ContextualParser, ParseContext, ParsingError, ParsingResult, ProductParser};
use crate::domain::product::{ProductRef, ProductSet, ProductSource};
use crate::infrastructure::config::ExtractionConfig;

const ANCHOR_SELECTOR: &str = "a[href]";
const IMAGE_SELECTOR: &str = "img";

/// Parser for product links on listing pages
pub struct AnchorProductParser {
    anchor_selector: Selector,
    image_selector: Selector,
    path_marker: String,
    default_label: String,
}

impl AnchorProductParser {
    /// Create a parser with default markers
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ExtractionConfig::default())
    }

    /// Create parser with custom extraction configuration
    pub fn with_config(config: &ExtractionConfig) -> ParsingResult<Self> {
        ParsingError::require_non_empty("product_path_marker", &config.product_path_marker)?;

        Ok(Self {
            anchor_selector: compile_selector(ANCHOR_SELECTOR)?,
            image_selector: compile_selector(IMAGE_SELECTOR)?,
            path_marker: config.product_path_marker.clone(),
            default_label: config.default_label.clone(),
        })
    }

    fn product_from_anchor(&self, anchor: &ElementRef, context: &ParseContext) -> Option<ProductRef> {
        let href = anchor.value().attr("href")?;
        let code = code_from_href(href, &self.path_marker)?;

        let image = anchor.select(&self.image_selector).next();
        let image_url = image
            .and_then(|img| non_empty_attr(&img, "src").or_else(|| non_empty_attr(&img, "data-src")))
            .map(|src| context.resolve_url(src));
        let label = image
            .and_then(|img| non_empty_attr(&img, "alt"))
            .map_or_else(|| self.default_label.clone(), str::to_string);

        Some(
            ProductRef::new(code, ProductSource::Dom)
                .with_image(image_url)
                .with_name(Some(label)),
        )
    }
}

impl ContextualParser for AnchorProductParser {
    type Output = ProductSet;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let mut products = ProductSet::new();
        let mut duplicates = 0usize;

        for anchor in html.select(&self.anchor_selector) {
            if let Some(product) = self.product_from_anchor(&anchor, context) {
                if !products.insert(product) {
                    duplicates += 1;
                }
            }
        }

        if duplicates > 0 {
            trace!("Ignored {} duplicate product anchors", duplicates);
        }
        debug!(
            "Anchor scan found {} products on page {}",
            products.len(),
            context.page
        );
        Ok(products)
    }
}

impl ProductParser for AnchorProductParser {
    fn source(&self) -> ProductSource {
        ProductSource::Dom
    }
}

/// Product code from a link: the path segment right after `marker`.
///
/// Query string, fragment and deeper path segments are cut off.
pub fn code_from_href<'a>(href: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = href.split_once(marker)?;
    let end = rest.find(['?', '#', '/']).unwrap_or(rest.len());
    let code = rest[..end].trim();
    (!code.is_empty()).then_some(code)
}

fn non_empty_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub(crate) fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}
