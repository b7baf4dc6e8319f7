//! HTML parsing infrastructure for listing pages
//!
//! The document parsers sit behind the same context-aware trait, so the
//! extraction service can run them side by side over one document. The text
//! scan works on the raw response body instead.

pub mod anchor_parser;
pub mod context;
pub mod embedded_state_parser;
pub mod error;
pub mod js_literal;
pub mod text_scan_parser;

// Re-export public types
pub use anchor_parser::AnchorProductParser;
pub use context::ParseContext;
pub use embedded_state_parser::EmbeddedStateParser;
pub use error::{ParsingError, ParsingResult};
pub use text_scan_parser::TextScanParser;

use scraper::Html;

use crate::domain::product::{ProductSet, ProductSource};

/// Parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}

/// A product extraction strategy
pub trait ProductParser:
    ContextualParser<Output = ProductSet, Context = ParseContext> + Send + Sync
{
    /// Which source the produced records are tagged with
    fn source(&self) -> ProductSource;
}
