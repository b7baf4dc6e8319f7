//! Infrastructure layer: configuration, logging, HTTP and HTML parsing
//!
//! Everything that touches the outside world lives here. The domain and
//! application layers only see the `PageFetcher` seam and plain parser output.

pub mod config; // Configuration file management
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod parsing;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, ExtractionConfig, LoggingConfig, ScraperConfig};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::{
    AnchorProductParser, ContextualParser, EmbeddedStateParser, ParseContext, ParsingError,
    ParsingResult, ProductParser, TextScanParser,
};
