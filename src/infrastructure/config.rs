//! Configuration infrastructure
//!
//! Configuration is organized into two tiers:
//! 1. User settings (site, HTTP behaviour, logging, export)
//! 2. Advanced settings (extraction markers and field names, config file only)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// User-configurable settings
    pub user: UserConfig,

    /// Hidden/Advanced settings (config file only)
    pub advanced: AdvancedConfig,
}

/// User-configurable settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub scraper: ScraperConfig,
    pub logging: LoggingConfig,
}

/// Fetching and session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Search URLs must contain this prefix
    pub site_base: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// User agent string sent with every request
    pub user_agent: String,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,

    /// Fall back to a raw-text scan when both extractors come up empty
    pub text_scan_fallback: bool,

    /// Directory for downloaded code lists (current directory when unset)
    pub export_dir: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console (stderr) output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

/// Hidden/Advanced settings that are in the config file only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub extraction: ExtractionConfig,
}

/// Markers and field names used by the extractors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Path segment that identifies a product link (e.g. "/Product/")
    pub product_path_marker: String,

    /// Text that identifies a client-state script block
    pub state_marker: String,

    /// Key holding the type name inside the state blob
    pub type_discriminator_key: String,

    /// Type name that marks a product record
    pub product_type_name: String,

    /// Identifier field candidates, first match wins
    pub id_fields: Vec<String>,

    /// Display name field candidates, first match wins
    pub name_fields: Vec<String>,

    /// Thumbnail field candidates, first match wins
    pub image_fields: Vec<String>,

    /// Label used when an anchor carries no image alt text
    pub default_label: String,

    /// Pattern for the raw-text fallback scan; capture group 1 is the code
    pub text_scan_pattern: String,

    /// Label attached to products found by the raw-text scan
    pub text_scan_label: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site_base: site::BASE_URL.to_string(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            accept_invalid_certs: defaults::ACCEPT_INVALID_CERTS,
            text_scan_fallback: defaults::TEXT_SCAN_FALLBACK,
            export_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let module_filters = [
            ("reqwest", "info"),
            ("hyper", "warn"),
            ("html5ever", "warn"),
            ("selectors", "warn"),
            ("rustyline", "warn"),
        ]
        .into_iter()
        .map(|(module, level)| (module.to_string(), level.to_string()))
        .collect();

        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            max_files: defaults::LOG_MAX_FILES,
            module_filters,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let owned = |fields: &[&str]| fields.iter().map(|s| (*s).to_string()).collect();
        Self {
            product_path_marker: defaults::PRODUCT_PATH_MARKER.to_string(),
            state_marker: defaults::STATE_MARKER.to_string(),
            type_discriminator_key: defaults::TYPE_DISCRIMINATOR_KEY.to_string(),
            product_type_name: defaults::PRODUCT_TYPE_NAME.to_string(),
            id_fields: owned(defaults::ID_FIELDS),
            name_fields: owned(defaults::NAME_FIELDS),
            image_fields: owned(defaults::IMAGE_FIELDS),
            default_label: defaults::DEFAULT_LABEL.to_string(),
            text_scan_pattern: defaults::TEXT_SCAN_PATTERN.to_string(),
            text_scan_label: defaults::TEXT_SCAN_LABEL.to_string(),
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(APP_DIR_NAME);

        Ok(data_dir)
    }

    /// Create a configuration manager for the default location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Create a configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration parse error: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                // Keep a copy of the broken file around for inspection
                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Directory name used under the platform config/data dirs
pub const APP_DIR_NAME: &str = "product-extractor";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Target site constants
pub mod site {
    /// Base URL of the supported mall; search URLs must contain it
    pub const BASE_URL: &str = "https://www.kolonmall.com/";
}

/// Default configuration values
pub mod defaults {
    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    /// Desktop browser user agent
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// The mall serves an incomplete certificate chain
    pub const ACCEPT_INVALID_CERTS: bool = true;

    /// Raw-text fallback scan is opt-in
    pub const TEXT_SCAN_FALLBACK: bool = false;

    // Extraction defaults
    pub const PRODUCT_PATH_MARKER: &str = "/Product/";
    pub const STATE_MARKER: &str = "__APOLLO_STATE__";
    pub const TYPE_DISCRIMINATOR_KEY: &str = "__typename";
    pub const PRODUCT_TYPE_NAME: &str = "Product";
    pub const ID_FIELDS: &[&str] = &["code", "productCode", "id"];
    pub const NAME_FIELDS: &[&str] = &["name", "productName", "title"];
    pub const IMAGE_FIELDS: &[&str] = &["imageUrl", "thumbnailUrl", "image", "thumbnail"];
    pub const DEFAULT_LABEL: &str = "Unknown Product";
    pub const TEXT_SCAN_PATTERN: &str = r"/Product/([A-Z0-9]+)";
    pub const TEXT_SCAN_LABEL: &str = "Detected by Text Scan";

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = true;
    pub const LOG_MAX_FILES: u32 = 5;
}
