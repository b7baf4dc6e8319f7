//! Product listing and selection commands

use tracing::debug;

use super::session_commands::reject;
use crate::application::{AppState, SessionError};

/// One row of the product list as shown to the user
#[derive(Debug, Clone)]
pub struct ProductRow {
    /// 1-based display position
    pub index: usize,
    pub code: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub code: String,
    pub selected: bool,
}

/// Current products in display order
pub fn list_products(state: &AppState) -> Vec<ProductRow> {
    state
        .products()
        .iter()
        .enumerate()
        .map(|(i, product)| ProductRow {
            index: i + 1,
            code: product.code.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            detail_url: product.detail_url(state.site_base()),
            selected: state.selection().is_selected(&product.code),
        })
        .collect()
}

/// Toggle each code. Nothing changes if any code is not on the page.
pub fn toggle_products(state: &mut AppState, codes: &[&str]) -> Result<Vec<SelectionChange>, String> {
    if codes.is_empty() {
        return Err("Usage: /select <code>...".to_string());
    }
    if state.base_url().is_none() {
        return Err(reject(state, SessionError::NoActiveSearch));
    }
    if let Some(unknown) = codes.iter().find(|code| !state.products().contains(code)) {
        let error = SessionError::UnknownProduct {
            code: unknown.to_string(),
        };
        return Err(reject(state, error));
    }

    let mut changes = Vec::with_capacity(codes.len());
    for code in codes {
        let selected = state.toggle_selection(code).map_err(|e| reject(state, e))?;
        changes.push(SelectionChange {
            code: code.to_string(),
            selected,
        });
    }

    debug!("Selection now holds {} codes", state.selection().len());
    state.set_notice(format!("{} products selected", state.selection().len()));
    Ok(changes)
}

/// Select every product on the page; returns the selection size
pub fn select_all_products(state: &mut AppState) -> Result<usize, String> {
    if state.base_url().is_none() {
        return Err(reject(state, SessionError::NoActiveSearch));
    }
    let count = state.select_all();
    state.set_notice(format!("{count} products selected"));
    Ok(count)
}

/// Clear the selection; returns how many codes were dropped
pub fn clear_selection(state: &mut AppState) -> usize {
    let dropped = state.selection().len();
    state.clear_selection();
    state.set_notice("Selection cleared");
    dropped
}
