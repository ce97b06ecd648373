//! Application layer - extraction use cases
//!
//! This module wires the parsing infrastructure into a single service that
//! turns one directory page into an [`ExtractionReport`].

pub mod extraction_service;
pub mod progress;

// Re-export commonly used items
pub use extraction_service::{ContactExtractionService, ExtractionReport};
pub use progress::{NoOpProgressObserver, ProgressObserver, ThrottledProgress};
