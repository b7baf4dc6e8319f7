//! Session-level errors surfaced to the user

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::export::ExportScope;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Please enter a URL")]
    EmptyUrl,

    #[error("Only {site_base} URLs are supported: {url}")]
    UnsupportedSite { url: String, site_base: String },

    #[error("No active search. Start with /search <url>")]
    NoActiveSearch,

    #[error("Product code not on the current page: {code}")]
    UnknownProduct { code: String },

    #[error("Nothing to export: the {scope} list is empty")]
    EmptyExport { scope: ExportScope },

    #[error("Failed to write {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    /// Errors the user can fix by changing their input
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Export { .. })
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
