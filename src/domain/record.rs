use serde::{Deserialize, Serialize};

use super::contact::ContactOutcome;
use super::name::Name;

/// One extracted contact, the unit handed to export and review layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: Name,
    pub contact: ContactOutcome,
    /// Source text the record was built from
    pub raw_text: String,
    pub score: f64,
    /// Set when no usable name came out; the raw text is kept for manual fixing
    pub unparsable: bool,
    /// Strategy that produced the record, `None` for fallbacks
    pub strategy: Option<String>,
}

impl Record {
    pub fn new(name: Name, contact: ContactOutcome, raw_text: impl Into<String>) -> Self {
        let score = if name.first.trim().is_empty() { 0.0 } else { name.score };
        Self {
            unparsable: score == 0.0,
            name,
            contact,
            raw_text: raw_text.into(),
            score,
            strategy: None,
        }
    }

    /// Record for a container nothing could make sense of
    pub fn unparsable(raw_text: impl Into<String>, contact: ContactOutcome) -> Self {
        Self::new(Name::default(), contact, raw_text)
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: &str) -> Self {
        self.strategy = Some(strategy.to_string());
        self
    }
}
