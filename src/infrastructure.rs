//! Infrastructure layer for parsing, configuration and external integrations
//!
//! This module provides the extraction engine, its error types, the
//! configuration and logging setup, and the optional HTTP collaborator used
//! to follow detail page links.

pub mod config; // Tunable thresholds and logging settings
#[cfg(feature = "http")]
pub mod http_client; // Blocking detail page fetcher
pub mod logging; // Logging infrastructure
pub mod parsing; // Extraction engine
pub mod parsing_error; // Error taxonomy

// Re-export commonly used items
pub use config::{ExtractionConfig, LoggingConfig};
#[cfg(feature = "http")]
pub use http_client::{HttpClientConfig, HttpDetailPageResolver};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{
    ContactLinkLocator, ContainerHistogram, DetailPageResolver, NoDetailPages, PageClassifier,
    validate_charset,
};
pub use parsing_error::{ExtractionError, ExtractionResult};
