//! 페이지 수집 서비스 트레이트 정의
//!
//! The extraction pipeline only needs "give me the HTML behind this URL".
//! The HTTP client implements it for real runs; tests plug in canned pages.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching a listing page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out after {timeout_seconds}s: {url}")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("HTTP request failed: {message}")]
    RequestFailed { url: String, message: String },

    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Empty response from {url}")]
    EmptyBody { url: String },

    #[error("HTTP client setup failed: {message}")]
    ClientSetup { message: String },
}

impl FetchError {
    /// URL the failed request was sent to, when there was one
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Timeout { url, .. }
            | Self::RequestFailed { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::EmptyBody { url } => Some(url),
            Self::ClientSetup { .. } => None,
        }
    }
}

/// 리스트 페이지 HTML 수집
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body as text, one attempt only
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}
