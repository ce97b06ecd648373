//! Domain module - value types shared by the extraction engine
//!
//! Everything here is created fresh per extraction run and never mutated
//! afterwards, except the [`Lexicon`] which the caller builds once and shares.

pub mod contact;
pub mod lexicon;
pub mod name;
pub mod page;
pub mod record;

pub use contact::{ContactLink, ContactLinkType, ContactOutcome};
pub use lexicon::{Lexicon, LexiconBuilder, fold, parse_abbreviation_list, parse_word_list};
pub use name::Name;
pub use page::{ContainerKind, PageClassification, PageContactType};
pub use record::Record;
