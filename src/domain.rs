//! Domain module - Core business logic and entities
//!
//! Product references, the ordered product set, pagination, selection
//! and export rules. Nothing in here performs I/O.

pub mod export;
pub mod pagination;
pub mod product;
pub mod selection;
pub mod services;

// Re-export commonly used items for convenience
pub use export::{EXPORT_FILE_NAME, ExportScope, codes_as_text, scoped_codes};
pub use pagination::{FIRST_PAGE, PageCursor, PageDirection, page_url};
pub use product::{ProductRef, ProductSet, ProductSource};
pub use selection::Selection;
pub use services::{FetchError, PageFetcher};
