use std::fmt;
use std::str::FromStr;

use super::product::ProductSet;
use super::selection::Selection;

/// Default file name for downloaded code lists
pub const EXPORT_FILE_NAME: &str = "product_urls.txt";

/// Which products an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// 전체: every product on the current page
    #[default]
    All,
    /// 선택: only the user-selected subset
    Selected,
}

impl fmt::Display for ExportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Selected => f.write_str("selected"),
        }
    }
}

impl FromStr for ExportScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "selected" | "sel" => Ok(Self::Selected),
            other => Err(format!("Unknown export scope '{other}' (expected 'all' or 'selected')")),
        }
    }
}

/// Codes covered by `scope`, in display order
pub fn scoped_codes<'a>(
    products: &'a ProductSet,
    selection: &Selection,
    scope: ExportScope,
) -> Vec<&'a str> {
    match scope {
        ExportScope::All => products.codes(),
        ExportScope::Selected => selection.ordered_codes(products),
    }
}

/// Newline-delimited code list without a trailing newline
pub fn codes_as_text(codes: &[&str]) -> String {
    codes.join("\n")
}
