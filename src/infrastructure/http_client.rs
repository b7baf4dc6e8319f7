//! HTTP client for fetching listing pages
//!
//! One GET per page with a browser-like header set and a short timeout.
//! No retry and no rate limiting: every request is triggered by a user action.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::domain::services::{FetchError, PageFetcher};
use crate::infrastructure::config::{ScraperConfig, defaults};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_KO: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from the scraper settings
    pub fn from_scraper_config(scraper: &ScraperConfig) -> Self {
        Self {
            timeout_seconds: scraper.request_timeout_seconds,
            user_agent: scraper.user_agent.clone(),
            accept_invalid_certs: scraper.accept_invalid_certs,
            follow_redirects: true,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            accept_invalid_certs: defaults::ACCEPT_INVALID_CERTS,
            follow_redirects: true,
        }
    }
}

/// HTTP client for listing pages
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client from the scraper settings
    pub fn from_scraper_config(scraper: &ScraperConfig) -> Result<Self, FetchError> {
        Self::with_config(HttpClientConfig::from_scraper_config(scraper))
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_KO));

        if config.accept_invalid_certs {
            debug!("TLS certificate verification disabled");
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| FetchError::ClientSetup {
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Fetch HTML content and return it as a string (single attempt)
    pub async fn fetch_html_string(&self, url: &str) -> Result<String, FetchError> {
        info!("🌐 HTTP GET: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout_seconds: self.config.timeout_seconds,
                }
            } else {
                FetchError::RequestFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html_content = response.text().await.map_err(|e| FetchError::RequestFailed {
            url: url.to_string(),
            message: format!("Failed to read response body: {e}"),
        })?;

        if html_content.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        debug!("Fetched {} bytes from {}", html_content.len(), url);
        Ok(html_content)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_html_string(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::with_config(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_config_from_scraper_settings() {
        let scraper = ScraperConfig {
            request_timeout_seconds: 3,
            user_agent: "Test Agent".to_string(),
            accept_invalid_certs: false,
            ..ScraperConfig::default()
        };

        let client = HttpClient::from_scraper_config(&scraper).unwrap();
        assert_eq!(client.config().timeout_seconds, 3);
        assert_eq!(client.config().user_agent, "Test Agent");
        assert!(!client.config().accept_invalid_certs);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_reported() {
        let client = HttpClient::with_config(HttpClientConfig {
            timeout_seconds: 2,
            ..HttpClientConfig::default()
        })
        .unwrap();

        // Port 9 on localhost (discard) is closed on any sane test machine
        let result = client.fetch_page("http://127.0.0.1:9/list").await;
        let err = result.unwrap_err();
        assert_eq!(err.url(), Some("http://127.0.0.1:9/list"));
    }
}
