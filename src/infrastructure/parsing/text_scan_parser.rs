//! Raw-text product scan
//!
//! Last-resort extraction: a regex over the response body as fetched, before
//! any HTML parsing. Capture group 1 of the configured pattern is the product
//! code.

use regex::Regex;

use super::{ParsingError, ParsingResult};
use crate::domain::product::{ProductRef, ProductSet, ProductSource};
use crate::infrastructure::config::ExtractionConfig;

pub struct TextScanParser {
    pattern: Regex,
    label: String,
}

impl TextScanParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ExtractionConfig::default())
    }

    pub fn with_config(config: &ExtractionConfig) -> ParsingResult<Self> {
        let pattern = Regex::new(&config.text_scan_pattern).map_err(|e| {
            ParsingError::InvalidPattern {
                pattern: config.text_scan_pattern.clone(),
                reason: e.to_string(),
            }
        })?;

        if pattern.captures_len() < 2 {
            return Err(ParsingError::configuration(
                "text_scan_pattern",
                "pattern needs a capture group for the product code",
            ));
        }

        Ok(Self {
            pattern,
            label: config.text_scan_label.clone(),
        })
    }

    /// Scan raw text for product codes
    pub fn scan(&self, text: &str) -> ProductSet {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|code| code.as_str().trim())
            .filter(|code| !code.is_empty())
            .map(|code| {
                ProductRef::new(code, ProductSource::TextScan).with_name(Some(self.label.clone()))
            })
            .collect()
    }
}
