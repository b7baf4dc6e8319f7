use std::collections::HashSet;

use super::product::ProductSet;

/// User-selected subset of the current products
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    codes: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the selection state of `code`; returns the new state
    pub fn toggle(&mut self, code: &str) -> bool {
        if self.codes.remove(code) {
            false
        } else {
            self.codes.insert(code.to_string());
            true
        }
    }

    pub fn set(&mut self, code: &str, selected: bool) {
        if selected {
            self.codes.insert(code.to_string());
        } else {
            self.codes.remove(code);
        }
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Select (or deselect) every product currently shown
    pub fn select_all(&mut self, products: &ProductSet, selected: bool) {
        if selected {
            self.codes
                .extend(products.iter().map(|product| product.code.clone()));
        } else {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    /// Drop codes that are no longer on the page
    pub fn retain_existing(&mut self, products: &ProductSet) {
        self.codes.retain(|code| products.contains(code));
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Selected codes in the display order of `products`
    pub fn ordered_codes<'a>(&self, products: &'a ProductSet) -> Vec<&'a str> {
        products
            .iter()
            .filter(|product| self.codes.contains(&product.code))
            .map(|product| product.code.as_str())
            .collect()
    }
}
