//! Extraction error types for the contact mining engine
//!
//! Per-candidate failures are recoverable: the pipeline turns them into
//! unparsable records and keeps going. Only a missing lexicon or an invalid
//! configuration stops an extraction run.

use thiserror::Error;

use crate::domain::ContactLinkType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("No contact link found for '{scope}'")]
    NoContactLinkFound { scope: String },

    #[error("Multiple {link_type} contact links in the same scope: {}", addresses.join(", "))]
    MultipleContactLinksOfSameType {
        link_type: ContactLinkType,
        addresses: Vec<String>,
    },

    #[error("Cannot parse a person name from '{text}'")]
    CannotParseName { text: String },

    #[error("No record strategy could extract '{text}' ({attempted} strategies tried)")]
    CannotExtractRecord { text: String, attempted: usize },

    #[error("Unsupported character encoding: {encoding}")]
    EncodingUnsupported { encoding: String },

    #[error("Detail page fetch failed: {url} - {reason}")]
    DetailPageFetchFailed { url: String, reason: String },

    #[error("Lexicon unavailable: {list} - {reason}")]
    LexiconUnavailable { list: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, field: String },
}

impl ExtractionError {
    /// Create a no-contact-link error for the given scope description
    pub fn no_contact_link(scope: &str) -> Self {
        Self::NoContactLinkFound {
            scope: scope.to_string(),
        }
    }

    /// Create an ambiguity error listing every distinct address seen
    pub fn multiple_contact_links(link_type: ContactLinkType, addresses: Vec<String>) -> Self {
        Self::MultipleContactLinksOfSameType {
            link_type,
            addresses,
        }
    }

    pub fn cannot_parse_name(text: &str) -> Self {
        Self::CannotParseName {
            text: text.to_string(),
        }
    }

    pub fn cannot_extract_record(text: &str, attempted: usize) -> Self {
        Self::CannotExtractRecord {
            text: text.to_string(),
            attempted,
        }
    }

    pub fn encoding_unsupported(encoding: &str) -> Self {
        Self::EncodingUnsupported {
            encoding: encoding.to_string(),
        }
    }

    /// Create a detail page fetch error
    pub fn detail_page_fetch_failed(url: &str, reason: impl Into<String>) -> Self {
        Self::DetailPageFetchFailed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub fn lexicon_unavailable(list: &str, reason: &str) -> Self {
        Self::LexiconUnavailable {
            list: list.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error for a specific field
    pub fn configuration(field: &str, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            field: field.to_string(),
        }
    }

    /// Check if this error only affects a single candidate
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NoContactLinkFound { .. } => true,
            Self::MultipleContactLinksOfSameType { .. } => true,
            Self::CannotParseName { .. } => true,
            Self::CannotExtractRecord { .. } => true,
            Self::DetailPageFetchFailed { .. } => true,
            Self::EncodingUnsupported { .. } => false,
            Self::LexiconUnavailable { .. } => false,
            Self::ConfigurationError { .. } => false,
        }
    }

    /// Detail page failures are reported as "no contact link" to callers
    #[must_use]
    pub fn collapse_fetch_failure(self) -> Self {
        match self {
            Self::DetailPageFetchFailed { url, .. } => Self::NoContactLinkFound { scope: url },
            other => other,
        }
    }
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_taxonomy() {
        assert!(ExtractionError::no_contact_link("row").is_recoverable());
        assert!(ExtractionError::cannot_parse_name("---").is_recoverable());
        assert!(!ExtractionError::lexicon_unavailable("first_names", "empty").is_recoverable());
        assert!(!ExtractionError::configuration("tolerance", "negative").is_recoverable());
        assert!(!ExtractionError::encoding_unsupported("klingon-8").is_recoverable());
    }

    #[test]
    fn test_fetch_failure_collapses_to_no_contact_link() {
        let err = ExtractionError::detail_page_fetch_failed("https://example.edu/p/1", "timeout");
        assert_eq!(
            err.collapse_fetch_failure(),
            ExtractionError::NoContactLinkFound {
                scope: "https://example.edu/p/1".to_string()
            }
        );

        let other = ExtractionError::cannot_parse_name("x");
        assert_eq!(other.clone().collapse_fetch_failure(), other);
    }

    #[test]
    fn test_multiple_links_message_lists_addresses() {
        let err = ExtractionError::multiple_contact_links(
            ContactLinkType::EmailInHref,
            vec!["a@uni.edu".to_string(), "b@uni.edu".to_string()],
        );
        let message = err.to_string();
        assert!(message.contains("a@uni.edu"));
        assert!(message.contains("b@uni.edu"));
    }
}
