//! Application layer module
//!
//! Session state and the extraction pipeline that orchestrate the domain logic.

pub mod error;
pub mod extraction_service;
pub mod state;

pub use error::{SessionError, SessionResult};
pub use extraction_service::{
    ExtractionReport, MergedProducts, ProductExtractionService, merge_sources,
};
pub use state::AppState;
