//! Domain services
//!
//! Seams the application layer depends on without knowing the transport.

pub mod fetch_services;

pub use fetch_services::{FetchError, PageFetcher};
