//! Export commands: write the code list to a file or to stdout

use std::path::{Path, PathBuf};
use tracing::info;

use super::session_commands::reject;
use crate::application::{AppState, SessionError};
use crate::domain::export::{EXPORT_FILE_NAME, ExportScope, codes_as_text, scoped_codes};

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub count: usize,
    pub scope: String,
}

/// File used by `download` when no path is given
pub fn default_export_path(state: &AppState) -> PathBuf {
    state
        .config()
        .user
        .scraper
        .export_dir
        .as_deref()
        .unwrap_or_else(|| Path::new("."))
        .join(EXPORT_FILE_NAME)
}

/// Newline-delimited codes for `scope`, or an error when the scope is empty
pub fn export_text(state: &mut AppState, scope: ExportScope) -> Result<(String, usize), String> {
    let codes = scoped_codes(state.products(), state.selection(), scope);
    if codes.is_empty() {
        return Err(reject(state, SessionError::EmptyExport { scope }));
    }
    let count = codes.len();
    Ok((codes_as_text(&codes), count))
}

/// Text for the `copy` command; the caller prints it to stdout
pub fn copy_codes(state: &mut AppState, scope: ExportScope) -> Result<String, String> {
    let (text, count) = export_text(state, scope)?;
    state.set_notice(format!("Copied {count} product codes"));
    Ok(text)
}

/// Write the code list to `target` (or the default export file).
///
/// A target that is an existing directory receives the default file name.
pub async fn download_codes(
    state: &mut AppState,
    target: Option<PathBuf>,
    scope: ExportScope,
) -> Result<ExportSummary, String> {
    let (text, count) = export_text(state, scope)?;

    let mut path = target.unwrap_or_else(|| default_export_path(state));
    if tokio::fs::metadata(&path)
        .await
        .is_ok_and(|meta| meta.is_dir())
    {
        path = path.join(EXPORT_FILE_NAME);
    }

    if let Err(source) = write_text(&path, &text).await {
        return Err(reject(state, SessionError::Export { path, source }));
    }

    info!("Exported {} codes to {}", count, path.display());
    state.set_notice(format!("Saved {count} product codes to {}", path.display()));
    Ok(ExportSummary {
        path,
        count,
        scope: scope.to_string(),
    })
}

async fn write_text(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, text).await
}
