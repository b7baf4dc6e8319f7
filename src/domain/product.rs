use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which extractor produced a product record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductSource {
    /// Anchor tags pointing at a product path
    Dom,
    /// Client-state JSON embedded in a script block
    EmbeddedState,
    /// Raw-text regex scan of the page body
    TextScan,
}

impl fmt::Display for ProductSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Dom => "dom",
            Self::EmbeddedState => "embedded-state",
            Self::TextScan => "text-scan",
        };
        f.write_str(label)
    }
}

/// Product reference found on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product code parsed from the URL path or the state blob (unique key)
    pub code: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub name: Option<String>,
    pub source: ProductSource,
}

impl ProductRef {
    pub fn new(code: impl Into<String>, source: ProductSource) -> Self {
        Self {
            code: code.into(),
            image_url: None,
            name: None,
            source,
        }
    }

    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Product detail page link on the given site
    pub fn detail_url(&self, site_base: &str) -> String {
        format!("{}/Product/{}", site_base.trim_end_matches('/'), self.code)
    }
}

/// Insertion-ordered collection of products keyed by code.
///
/// The first record inserted for a code wins; later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSet {
    items: IndexMap<String, ProductRef>,
}

impl ProductSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product, returning `false` if the code was already present
    pub fn insert(&mut self, product: ProductRef) -> bool {
        if self.items.contains_key(&product.code) {
            return false;
        }
        self.items.insert(product.code.clone(), product);
        true
    }

    pub fn get(&self, code: &str) -> Option<&ProductRef> {
        self.items.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.items.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRef> {
        self.items.values()
    }

    /// Codes in display order
    pub fn codes(&self) -> Vec<&str> {
        self.items.keys().map(String::as_str).collect()
    }
}

impl FromIterator<ProductRef> for ProductSet {
    fn from_iter<I: IntoIterator<Item = ProductRef>>(iter: I) -> Self {
        let mut set = Self::new();
        for product in iter {
            set.insert(product);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ProductSet {
    type Item = &'a ProductRef;
    type IntoIter = indexmap::map::Values<'a, String, ProductRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}
