//! Heuristic contact extraction engine
//!
//! The pipeline reads a borrowed DOM and never mutates it:
//! flattener → name detector → container resolver → classifier (with the
//! contact link locator's association figures) → record parser chain → name
//! token parser. Every component is a pure function of the DOM snapshot and
//! the immutable [`Lexicon`](crate::domain::Lexicon); only detail page
//! resolution may block, through an injected [`DetailPageResolver`].

pub mod classifier;
pub mod contact_link;
pub mod container;
pub mod dom;
pub mod encoding;
pub mod flattener;
pub mod name_detector;
pub mod name_parser;
pub mod record_parser;

// Re-export public types
pub use classifier::{PageClassifier, ToleranceComparator};
pub use contact_link::{
    AssociationStats, ContactLinkLocator, DetailPageResolver, FoundLink, NoDetailPages, outcome_of,
};
pub use container::{Container, ContainerGroup, ContainerHistogram, ContainerResolver};
pub use dom::{DomChild, DomNode, normalize_whitespace};
pub use encoding::{Charset, decode_bytes, validate_charset};
pub use flattener::{EMAIL_PATTERN, FlatDocument, Leaf};
pub use name_detector::{NameCandidate, NameDetector};
pub use name_parser::NameTokenParser;
pub use record_parser::{
    MultiRecordStrategy, RecordContext, RecordParserChain, SingleRecordStrategy,
};
