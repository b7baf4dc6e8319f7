//! Extraction pipeline tests: parsers, merge policy and the full fetch path
use async_trait::async_trait;
use proptest::prelude::*;
use rstest::rstest;

use product_extractor_lib::application::{ProductExtractionService, merge_sources};
use product_extractor_lib::domain::product::{ProductSet, ProductSource};
use product_extractor_lib::domain::services::{FetchError, PageFetcher};
use product_extractor_lib::infrastructure::config::{ExtractionConfig, ScraperConfig};
use product_extractor_lib::infrastructure::parsing::{
    AnchorProductParser, ContextualParser, EmbeddedStateParser, ParseContext,
};
use scraper::Html;

const LIST_URL: &str = "https://www.kolonmall.com/Category/List/001";

struct StaticFetcher(Result<String, FetchError>);

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_page(&self, _url: &str) -> Result<String, FetchError> {
        self.0.clone()
    }
}

fn service_with(html: &str, text_scan_fallback: bool) -> ProductExtractionService<StaticFetcher> {
    let scraper = ScraperConfig {
        text_scan_fallback,
        ..ScraperConfig::default()
    };
    ProductExtractionService::new(
        StaticFetcher(Ok(html.to_string())),
        &scraper,
        &ExtractionConfig::default(),
    )
    .unwrap()
}

fn dom_set(markup: &str) -> ProductSet {
    AnchorProductParser::new()
        .unwrap()
        .parse_with_context(&Html::parse_document(markup), &ParseContext::new(1, LIST_URL))
        .unwrap()
}

fn state_set(markup: &str) -> ProductSet {
    EmbeddedStateParser::new()
        .unwrap()
        .parse_with_context(&Html::parse_document(markup), &ParseContext::new(1, LIST_URL))
        .unwrap()
}

const DOM_ONLY: &str = r#"<html><body>
    <a href="/Product/A1"><img src="/img/a1.jpg" alt="Alpha"></a>
    <a href="/Product/A2"><img src="/img/a2.jpg" alt="Beta"></a>
    <a href="/Product/A1"><img src="/img/a1b.jpg" alt="Alpha again"></a>
    <a href="/Brand/B1">brand</a>
</body></html>"#;

const WITH_STATE: &str = r#"<html><head>
    <script>window.__APOLLO_STATE__ = JSON.restore({"ROOT_QUERY": {"items": [
        {"__typename": "Product", "code": "S1", "name": "State One"},
        {"__typename": "Product", "code": "S2", "name": "State Two", "price": undefined}
    ]}});</script>
</head><body>
    <a href="/Product/D1"><img src="/img/d1.jpg" alt="Dom One"></a>
</body></html>"#;

#[test]
fn duplicate_anchors_collapse_to_first() {
    let products = dom_set(DOM_ONLY);

    assert_eq!(products.codes(), vec!["A1", "A2"]);
    assert_eq!(products.get("A1").unwrap().name.as_deref(), Some("Alpha"));
}

#[test]
fn embedded_state_is_authoritative() {
    let service = service_with(WITH_STATE, false);
    let merged = service
        .extract_from_html(WITH_STATE, &ParseContext::new(1, LIST_URL))
        .unwrap();

    assert_eq!(merged.products, state_set(WITH_STATE));
    assert_eq!(merged.products.codes(), vec!["S1", "S2"]);
    assert_eq!(merged.source, Some(ProductSource::EmbeddedState));
}

#[test]
fn dom_used_without_state() {
    let service = service_with(DOM_ONLY, false);
    let merged = service
        .extract_from_html(DOM_ONLY, &ParseContext::new(1, LIST_URL))
        .unwrap();

    assert_eq!(merged.products, dom_set(DOM_ONLY));
    assert_eq!(merged.source, Some(ProductSource::Dom));
}

#[rstest]
#[case(false, &[])]
#[case(true, &["X100", "Y200"])]
fn text_scan_only_when_enabled(#[case] enabled: bool, #[case] expected: &[&str]) {
    let markup = r#"<html><body><div data-link="/Product/X100"></div>
        <span>see /Product/Y200 and /Product/X100</span></body></html>"#;
    let service = service_with(markup, enabled);
    let merged = service
        .extract_from_html(markup, &ParseContext::new(1, LIST_URL))
        .unwrap();

    assert_eq!(service.text_scan_enabled(), enabled);
    assert_eq!(merged.products.codes(), expected.to_vec());
}

#[tokio::test]
async fn text_scan_reads_response_body() {
    // the parser drops duplicate attributes and end-tag attributes
    let body = r#"<html><body><div data-link="/x" data-link="/Product/RAW1"></div data-next="/Product/RAW2">
        </body></html>"#;
    let service = service_with(body, true);

    let report = service.extract_from_url(LIST_URL, 1).await;

    assert!(report.is_success());
    assert_eq!(report.products.codes(), vec!["RAW1", "RAW2"]);
    assert_eq!(report.source, Some(ProductSource::TextScan));
}

#[tokio::test]
async fn fetch_failure_yields_empty_report() {
    let service = ProductExtractionService::new(
        StaticFetcher(Err(FetchError::HttpStatus {
            status: 503,
            url: LIST_URL.to_string(),
        })),
        &ScraperConfig::default(),
        &ExtractionConfig::default(),
    )
    .unwrap();

    let report = service.extract_from_url(LIST_URL, 2).await;

    assert!(!report.is_success());
    assert!(report.products.is_empty());
    assert_eq!(report.page, 2);
    assert!(report.error.unwrap().contains("503"));
}

#[tokio::test]
async fn successful_fetch_reports_source() {
    let service = service_with(WITH_STATE, false);
    let report = service.extract_from_url(LIST_URL, 1).await;

    assert!(report.is_success());
    assert_eq!(report.source, Some(ProductSource::EmbeddedState));
    assert_eq!(report.products.len(), 2);
}

fn anchor_page(codes: &[String]) -> String {
    let anchors: String = codes
        .iter()
        .map(|code| format!(r#"<a href="/Product/{code}?from=list">{code}</a>"#))
        .collect();
    format!("<html><body>{anchors}</body></html>")
}

proptest! {
    #[test]
    fn dom_codes_are_unique(codes in prop::collection::vec("[A-Z0-9]{1,6}", 0..30)) {
        let products = dom_set(&anchor_page(&codes));
        let listed = products.codes();

        let mut deduped = listed.clone();
        deduped.sort_unstable();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), listed.len());

        // first-occurrence order
        let mut expected: Vec<&str> = Vec::new();
        for code in &codes {
            if !expected.contains(&code.as_str()) {
                expected.push(code);
            }
        }
        prop_assert_eq!(listed, expected);
    }

    #[test]
    fn merge_prefers_non_empty_state(
        state_codes in prop::collection::vec("[A-Z]{2}[0-9]{2}", 0..10),
        dom_codes in prop::collection::vec("[A-Z]{2}[0-9]{2}", 0..10),
    ) {
        use product_extractor_lib::domain::product::ProductRef;

        let embedded: ProductSet = state_codes
            .iter()
            .map(|c| ProductRef::new(c.as_str(), ProductSource::EmbeddedState))
            .collect();
        let dom: ProductSet = dom_codes
            .iter()
            .map(|c| ProductRef::new(c.as_str(), ProductSource::Dom))
            .collect();

        let merged = merge_sources(embedded.clone(), dom.clone(), None);
        if embedded.is_empty() {
            prop_assert_eq!(merged.products, dom);
        } else {
            prop_assert_eq!(merged.products, embedded);
        }
    }
}
