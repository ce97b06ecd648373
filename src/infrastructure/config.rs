//! Configuration infrastructure
//!
//! Contains the tunable thresholds of the extraction engine and the logging
//! settings. Defaults reproduce the values the heuristics were calibrated
//! with; a JSON file can override any subset of them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::parsing_error::{ExtractionError, ExtractionResult};

/// Default values for every configuration field
pub mod defaults {
    /// Ancestor levels searched for a contact link above a container
    pub const MAX_ANCESTOR_LEVELS: usize = 5;

    /// Relative tolerance band of `approx_equal`
    pub const TOLERANCE: f64 = 0.15;

    /// Two counts are comparable when both exceed `max / COMPARABILITY_DIVISOR`
    pub const COMPARABILITY_DIVISOR: f64 = 4.0;

    /// Open lower bound of the names-per-container band
    pub const RATIO_BAND_LOW: f64 = 0.3;

    /// Upper bound of the names-per-container band
    pub const RATIO_BAND_HIGH: f64 = 1.0;

    pub const RESOLVE_DETAIL_PAGES: bool = true;

    pub const PROGRESS_STEP_PERCENT: u32 = 1;

    pub const LOG_LEVEL: &str = "info";
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Base URL for resolving relative detail page links
    pub base_url: Option<String>,

    /// How far above a container the contact link search may climb
    pub max_ancestor_levels: usize,

    pub tolerance: f64,

    pub comparability_divisor: f64,

    pub ratio_band_low: f64,

    pub ratio_band_high: f64,

    /// Follow detail page links to look for an e-mail address
    pub resolve_detail_pages: bool,

    /// Minimum whole-percent advance between progress notifications
    pub progress_step_percent: u32,

    pub logging: LoggingConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            max_ancestor_levels: defaults::MAX_ANCESTOR_LEVELS,
            tolerance: defaults::TOLERANCE,
            comparability_divisor: defaults::COMPARABILITY_DIVISOR,
            ratio_band_low: defaults::RATIO_BAND_LOW,
            ratio_band_high: defaults::RATIO_BAND_HIGH,
            resolve_detail_pages: defaults::RESOLVE_DETAIL_PAGES,
            progress_step_percent: defaults::PROGRESS_STEP_PERCENT,
            logging: LoggingConfig::default(),
        }
    }
}

impl ExtractionConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub const fn with_detail_pages(mut self, resolve: bool) -> Self {
        self.resolve_detail_pages = resolve;
        self
    }

    /// Parse a (possibly partial) JSON configuration
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).context("Configuration file contains invalid JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults if it doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Configuration file not found, using defaults: {:?}", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config = Self::from_json_str(&content)?;
        info!("Loaded configuration from: {:?}", path);
        Ok(config)
    }

    /// Reject values the heuristics cannot work with
    pub fn validate(&self) -> ExtractionResult<()> {
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(ExtractionError::configuration(
                "tolerance",
                format!("must be within (0, 1), got {}", self.tolerance),
            ));
        }
        if self.comparability_divisor < 1.0 {
            return Err(ExtractionError::configuration(
                "comparability_divisor",
                format!("must be at least 1, got {}", self.comparability_divisor),
            ));
        }
        if !(0.0..self.ratio_band_high).contains(&self.ratio_band_low) {
            return Err(ExtractionError::configuration(
                "ratio_band_low",
                format!(
                    "band ({}, {}] is empty or negative",
                    self.ratio_band_low, self.ratio_band_high
                ),
            ));
        }
        if let Some(base) = &self.base_url {
            url::Url::parse(base).map_err(|e| {
                ExtractionError::configuration("base_url", format!("'{base}' is not a URL: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for the log file; defaults to `logs/` next to the executable
    pub log_dir: Option<String>,

    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            file_name: "contact-miner.log".to_string(),
            module_filters: HashMap::new(),
        }
    }
}
