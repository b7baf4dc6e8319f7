//! Embedded client-state parser
//!
//! Listing pages ship a client-side cache as the argument of a JavaScript call
//! inside a `<script>` block. This parser recovers that argument as JSON and
//! walks it for records tagged as products.

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

use super::anchor_parser::compile_selector;
use super::js_literal::{call_argument, normalize_literals};
use super::{ContextualParser, ParseContext, ParsingError, ParsingResult, ProductParser};
use crate::domain::product::{ProductRef, ProductSet, ProductSource};
use crate::infrastructure::config::ExtractionConfig;

const SCRIPT_SELECTOR: &str = "script";

/// Keys tried on an image object, e.g. `{"url": "..."}`
const IMAGE_OBJECT_KEYS: &[&str] = &["url", "src"];

pub struct EmbeddedStateParser {
    script_selector: Selector,
    state_marker: String,
    type_key: String,
    type_name: String,
    id_fields: Vec<String>,
    name_fields: Vec<String>,
    image_fields: Vec<String>,
}

impl EmbeddedStateParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ExtractionConfig::default())
    }

    pub fn with_config(config: &ExtractionConfig) -> ParsingResult<Self> {
        ParsingError::require_non_empty("state_marker", &config.state_marker)?;
        ParsingError::require_non_empty("type_discriminator_key", &config.type_discriminator_key)?;
        ParsingError::require_non_empty("product_type_name", &config.product_type_name)?;
        if config.id_fields.is_empty() {
            return Err(ParsingError::configuration(
                "id_fields",
                "at least one identifier field is required",
            ));
        }

        Ok(Self {
            script_selector: compile_selector(SCRIPT_SELECTOR)?,
            state_marker: config.state_marker.clone(),
            type_key: config.type_discriminator_key.clone(),
            type_name: config.product_type_name.clone(),
            id_fields: config.id_fields.clone(),
            name_fields: config.name_fields.clone(),
            image_fields: config.image_fields.clone(),
        })
    }

    /// Decode one script body. `None` when the block holds no usable blob.
    pub fn decode_script(&self, script: &str) -> Option<Value> {
        let argument = call_argument(script, &self.state_marker)?;
        let json = normalize_literals(argument);
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Skipping malformed state block: {}", e);
                None
            }
        }
    }

    /// Collect product records from a decoded state value, depth first.
    pub fn collect(&self, value: &Value, products: &mut ProductSet) {
        match value {
            Value::Object(map) => {
                if self.is_product(map) {
                    if let Some(product) = self.product_from_record(map) {
                        products.insert(product);
                    }
                }
                for child in map.values() {
                    self.collect(child, products);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect(item, products);
                }
            }
            _ => {}
        }
    }

    fn is_product(&self, record: &Map<String, Value>) -> bool {
        record.get(&self.type_key).and_then(Value::as_str) == Some(self.type_name.as_str())
    }

    fn product_from_record(&self, record: &Map<String, Value>) -> Option<ProductRef> {
        let code = first_field(record, &self.id_fields, scalar_text)?;
        let name = first_field(record, &self.name_fields, string_text);
        let image_url = first_field(record, &self.image_fields, image_text);

        Some(
            ProductRef::new(code, ProductSource::EmbeddedState)
                .with_name(name)
                .with_image(image_url),
        )
    }
}

impl ContextualParser for EmbeddedStateParser {
    type Output = ProductSet;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let mut products = ProductSet::new();
        let mut blocks = 0usize;

        for script in html.select(&self.script_selector) {
            let text: String = script.text().collect();
            if !text.contains(&self.state_marker) {
                continue;
            }
            blocks += 1;
            if let Some(state) = self.decode_script(&text) {
                self.collect(&state, &mut products);
            }
        }

        debug!(
            "State scan read {} blocks, found {} products on page {}",
            blocks,
            products.len(),
            context.page
        );
        Ok(products)
    }
}

impl ProductParser for EmbeddedStateParser {
    fn source(&self) -> ProductSource {
        ProductSource::EmbeddedState
    }
}

/// First candidate field that converts to a non-empty string
fn first_field(
    record: &Map<String, Value>,
    fields: &[String],
    convert: fn(&Value) -> Option<String>,
) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| record.get(field))
        .find_map(convert)
}

fn string_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        other => string_text(other),
    }
}

fn image_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => IMAGE_OBJECT_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(string_text),
        other => string_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(markup: &str) -> ProductSet {
        EmbeddedStateParser::new()
            .unwrap()
            .parse_with_context(&Html::parse_document(markup), &ParseContext::detached())
            .unwrap()
    }

    #[test]
    fn test_collect_nested_records() {
        let parser = EmbeddedStateParser::new().unwrap();
        let state = json!({
            "ROOT_QUERY": {
                "list": [
                    {"__typename": "Product", "code": "P100", "name": "Jacket",
                     "imageUrl": "https://img/1.jpg"},
                    {"__typename": "Product", "productCode": 200, "title": "Pants",
                     "thumbnail": {"url": "https://img/2.jpg"}}
                ]
            },
            "Brand:1": {"__typename": "Brand", "code": "B1"},
            "Product:P300": {"__typename": "Product", "id": "P300",
                             "related": {"__typename": "Product", "code": "P400"}},
            "orphan": {"__typename": "Product", "name": "no id"}
        });

        let mut products = ProductSet::new();
        parser.collect(&state, &mut products);

        assert_eq!(products.codes(), vec!["P100", "200", "P300", "P400"]);
        let first = products.get("P100").unwrap();
        assert_eq!(first.name.as_deref(), Some("Jacket"));
        assert_eq!(first.image_url.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(first.source, ProductSource::EmbeddedState);

        let second = products.get("200").unwrap();
        assert_eq!(second.name.as_deref(), Some("Pants"));
        assert_eq!(second.image_url.as_deref(), Some("https://img/2.jpg"));

        assert_eq!(products.get("P300").unwrap().name, None);
    }

    #[test]
    fn test_parse_script_blocks() {
        let products = parse(
            r#"<html><head>
               <script>var analytics = {"__typename": "Product", "code": "X"};</script>
               <script>window.__APOLLO_STATE__ = restore({"a": {"__typename": "Product",
                   "code": "K1", "price": undefined, "score": NaN}});</script>
               </head><body></body></html>"#,
        );

        assert_eq!(products.codes(), vec!["K1"]);
    }

    #[test]
    fn test_bracket_assignment_form() {
        let products = parse(
            r#"<script>window["__APOLLO_STATE__"] = restore({"a":{"__typename":"Product","code":"K1"}});</script>"#,
        );

        assert_eq!(products.codes(), vec!["K1"]);
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let products = parse(
            r#"<script>window.__APOLLO_STATE__ = restore({"a": {broken);</script>
               <script>window.__APOLLO_STATE__ = restore({"b": {"__typename": "Product", "code": "OK1"}});</script>"#,
        );

        assert_eq!(products.codes(), vec!["OK1"]);
    }

    #[test]
    fn test_no_state_yields_empty_set() {
        assert!(parse("<html><body><a href='/Product/A1'>x</a></body></html>").is_empty());
    }

    #[test]
    fn test_missing_id_fields_rejected() {
        let config = ExtractionConfig {
            id_fields: Vec::new(),
            ..ExtractionConfig::default()
        };
        assert!(matches!(
            EmbeddedStateParser::with_config(&config),
            Err(ParsingError::ConfigurationError { .. })
        ));
    }
}
